//! Generic backend selection: round robin and least connections over a
//! fixed pool of backend identifiers.

pub mod config;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::GlbConfig;
pub use lifecycle::{CancelHandle, Context, ContextError};
pub use load_balancer::{LoadBalancer, LoadBalancerError, Strategy};
