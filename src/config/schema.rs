//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use url::Url;
use crate::load_balancer::Strategy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GlbConfig {
    /// Strategy and backend pool.
    pub balancer: BalancerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Load generated by the demo binary.
    pub demo: DemoConfig,
}

/// Load balancer configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Selection strategy (round_robin, least_conns, least_conns_heap).
    pub strategy: Strategy,

    /// Backend addresses, in pool order. Duplicates are allowed.
    pub backends: Vec<String>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::LeastConns,
            backends: vec![
                "https://localhost:3000".to_string(),
                "https://localhost:3001".to_string(),
                "https://localhost:3002".to_string(),
            ],
        }
    }
}

impl BalancerConfig {
    /// Parse every backend address, in pool order.
    pub fn backend_urls(&self) -> Result<Vec<Url>, url::ParseError> {
        self.backends.iter().map(|b| Url::parse(b)).collect()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Demo load shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Concurrent callers, each with its own context.
    pub callers: usize,

    /// Selections made by each caller before it cancels.
    pub calls_per_caller: usize,

    /// How long each caller holds its selections before cancelling.
    pub hold_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            callers: 2,
            calls_per_caller: 10,
            hold_ms: 50,
        }
    }
}
