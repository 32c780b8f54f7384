//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller context + static backend pool
//!     → Strategy picked once at construction (new)
//!     → LoadBalancer::next(ctx):
//!         - round_robin.rs (atomic rotation counter)
//!         - least_conn.rs / least_conn_heap.rs (fewest attributed callers)
//!     → Backend returned, or the context's cancellation error
//!     → (least connections) count released when ctx is cancelled
//! ```
//!
//! # Design Decisions
//! - Backend pool is fixed at construction and never resized
//! - Round robin is lock-free; least connections uses one pool-wide lock
//! - Calling code only sees `dyn LoadBalancer<T>`, never the strategy

pub mod backend;
pub mod least_conn;
pub mod least_conn_heap;
pub mod round_robin;

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::{Context, ContextError};

pub use least_conn::LeastConns;
pub use least_conn_heap::LeastConnsHeap;
pub use round_robin::RoundRobin;

/// Picks the backend that should handle the next unit of work.
pub trait LoadBalancer<T>: Send + Sync {
    /// Select a backend for a caller.
    ///
    /// Fails with the context's cancellation reason, without touching any
    /// balancer state, when `ctx` is already cancelled.
    fn next(&self, ctx: &Context) -> Result<T, ContextError>;

    /// The strategy this balancer implements.
    fn strategy(&self) -> Strategy;
}

/// Errors raised while building a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadBalancerError {
    /// The backend pool was empty.
    #[error("there should be at least one backend in args")]
    NotEnoughBackends,

    /// A strategy name that no implementation answers to.
    #[error("unexpected load balancing strategy: {0}")]
    UnknownStrategy(String),
}

/// Backend selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Strategy {
    /// Rotate through the pool in order.
    #[default]
    RoundRobin,
    /// Pick the backend with the fewest attributed callers.
    LeastConns,
    /// Least connections over individually allocated backend records.
    LeastConnsHeap,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::RoundRobin, Strategy::LeastConns, Strategy::LeastConnsHeap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "round_robin",
            Strategy::LeastConns => "least_conns",
            Strategy::LeastConnsHeap => "least_conns_heap",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = LoadBalancerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| LoadBalancerError::UnknownStrategy(s.to_string()))
    }
}

impl TryFrom<String> for Strategy {
    type Error = LoadBalancerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Build the load balancer for `strategy` over `backends`.
pub fn new<T>(strategy: Strategy, backends: Vec<T>) -> Result<Box<dyn LoadBalancer<T>>, LoadBalancerError>
where
    T: Clone + Send + Sync + 'static,
{
    let lb: Box<dyn LoadBalancer<T>> = match strategy {
        Strategy::RoundRobin => Box::new(RoundRobin::new(backends)?),
        Strategy::LeastConns => Box::new(LeastConns::new(backends)?),
        Strategy::LeastConnsHeap => Box::new(LeastConnsHeap::new(backends)?),
    };
    tracing::debug!(strategy = %strategy, "Load balancer created");
    Ok(lb)
}

/// Index of the least used backend given per-backend counts in pool order.
///
/// The first backend is the baseline. The scan stops at the first backend
/// whose count is strictly lower than the baseline's, so this is not a
/// global minimum: `[1, 2, 0]` yields 2 and `[3, 1, 0]` yields 1.
/// Returns 0 for an empty or single-element pool.
pub fn least_used_index<I>(counts: I) -> usize
where
    I: IntoIterator<Item = u64>,
{
    let mut counts = counts.into_iter();
    let Some(baseline) = counts.next() else {
        return 0;
    };
    counts
        .position(|count| count < baseline)
        .map_or(0, |offset| offset + 1)
}
