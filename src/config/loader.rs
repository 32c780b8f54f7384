//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::config::schema::GlbConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GlbConfig, ConfigError> {
    let config: GlbConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read a TOML file without semantic validation.
///
/// For callers that layer overrides on top before running
/// [`validate_config`] themselves.
pub fn read_config(path: &Path) -> Result<GlbConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GlbConfig = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), strategy = %config.balancer.strategy, "Configuration read");
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GlbConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::Strategy;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), GlbConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let config = parse_config(
            r#"
[balancer]
strategy = "round_robin"
backends = ["http://10.0.0.1:80", "http://10.0.0.2:80"]

[observability]
log_level = "debug"

[demo]
callers = 4
calls_per_caller = 3
hold_ms = 5
"#,
        )
        .unwrap();

        assert_eq!(config.balancer.strategy, Strategy::RoundRobin);
        assert_eq!(config.balancer.backends.len(), 2);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.demo.callers, 4);
        assert_eq!(config.demo.calls_per_caller, 3);
    }

    #[test]
    fn strategy_accepts_hyphenated_names() {
        let config = parse_config("[balancer]\nstrategy = \"least-conns-heap\"\n").unwrap();
        assert_eq!(config.balancer.strategy, Strategy::LeastConnsHeap);
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = parse_config("[balancer]\nstrategy = \"weighted\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_errors_are_reported_together() {
        let err = parse_config("[balancer]\nbackends = []\n[demo]\ncallers = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }
}
