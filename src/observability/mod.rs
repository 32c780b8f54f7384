//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! load_balancer::*:
//!     → logging.rs (structured tracing events: selection, release)
//!     → metrics.rs (selection counters, in-flight gauges)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Backends are logged by pool index; `T` carries no Display bound
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
