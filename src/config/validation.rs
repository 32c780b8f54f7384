//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate backend addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GlbConfig → Result<(), Vec<ValidationError>>
//! - Duplicate backends are accepted; each gets its own counter

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;
use crate::config::schema::GlbConfig;
use crate::observability::logging;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("balancer.backends must contain at least one backend")]
    NoBackends,

    #[error("balancer.backends[{index}] = {address:?} is not a valid URL: {reason}")]
    InvalidBackend {
        index: usize,
        address: String,
        reason: String,
    },

    #[error("demo.callers must be greater than zero")]
    NoCallers,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &GlbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.balancer.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for (index, address) in config.balancer.backends.iter().enumerate() {
        if let Err(e) = Url::parse(address) {
            errors.push(ValidationError::InvalidBackend {
                index,
                address: address.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.demo.callers == 0 {
        errors.push(ValidationError::NoCallers);
    }

    let obs = &config.observability;
    if !logging::is_valid_level(&obs.log_level) {
        errors.push(ValidationError::InvalidLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GlbConfig::default()), Ok(()));
    }

    #[test]
    fn duplicate_backends_are_allowed() {
        let mut config = GlbConfig::default();
        config.balancer.backends = vec!["http://a:1".into(), "http://a:1".into()];
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = GlbConfig::default();
        config.balancer.backends = vec!["http://ok:1".into(), "not a url".into()];
        config.demo.callers = 0;
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidBackend { index: 1, .. }));
        assert_eq!(errors[1], ValidationError::NoCallers);
        assert_eq!(errors[2], ValidationError::InvalidLogLevel("loud".into()));
        assert_eq!(errors[3], ValidationError::InvalidMetricsAddress("nowhere".into()));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let mut config = GlbConfig::default();
        config.balancer.backends.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoBackends]));
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = GlbConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
