//! Configuration loading from disk.

use std::fs;

use glb::config::{load_config, read_config, validate_config, ConfigError, ValidationError};
use glb::Strategy;
use tempfile::TempDir;

#[test]
fn test_load_toml_config() {
    let toml = r#"
[balancer]
strategy = "least_conns_heap"
backends = ["https://localhost:3000", "https://localhost:3001"]

[observability]
log_level = "debug"
metrics_enabled = true
metrics_address = "127.0.0.1:9100"

[demo]
callers = 3
calls_per_caller = 30
hold_ms = 10
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("glb.toml");
    fs::write(&config_path, toml).unwrap();

    let config = load_config(&config_path).unwrap();

    assert_eq!(config.balancer.strategy, Strategy::LeastConnsHeap);
    assert_eq!(config.balancer.backends.len(), 2);
    let urls = config.balancer.backend_urls().unwrap();
    assert_eq!(urls[1].port(), Some(3001));

    assert_eq!(config.observability.log_level, "debug");
    assert!(config.observability.metrics_enabled);
    assert_eq!(config.observability.metrics_address, "127.0.0.1:9100");

    assert_eq!(config.demo.callers, 3);
    assert_eq!(config.demo.calls_per_caller, 30);
    assert_eq!(config.demo.hold_ms, 10);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_config(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_backends_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("glb.toml");
    fs::write(&config_path, "[balancer]\nbackends = [\"localhost\"]\n").unwrap();

    match load_config(&config_path).unwrap_err() {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], ValidationError::InvalidBackend { index: 0, .. }));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_read_config_defers_validation_to_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("glb.toml");
    fs::write(&config_path, "[balancer]\nstrategy = \"round-robin\"\nbackends = []\n").unwrap();

    assert!(matches!(load_config(&config_path), Err(ConfigError::Validation(_))));

    let mut config = read_config(&config_path).unwrap();
    assert_eq!(config.balancer.strategy, Strategy::RoundRobin);
    assert_eq!(validate_config(&config), Err(vec![ValidationError::NoBackends]));

    config.balancer.backends = vec!["http://10.0.0.1:80".to_string()];
    assert_eq!(validate_config(&config), Ok(()));
}
