//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GlbConfig (validated, immutable)
//!     → strategy + backends handed to load_balancer::new
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the backend pool never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{BalancerConfig, DemoConfig, GlbConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
