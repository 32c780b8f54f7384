//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicU64, Ordering};
use crate::lifecycle::{Context, ContextError};
use crate::load_balancer::{LoadBalancer, LoadBalancerError, Strategy};
use crate::observability::metrics;

/// Round-robin selector.
/// Each successful call claims a unique slot from a shared counter; the
/// slot modulo the pool size is the chosen backend.
#[derive(Debug)]
pub struct RoundRobin<T> {
    // 64 bits makes wraparound unreachable in practice.
    counter: AtomicU64,
    backends: Vec<T>,
}

impl<T> RoundRobin<T> {
    /// Create a round-robin balancer over a non-empty pool.
    pub fn new(backends: Vec<T>) -> Result<Self, LoadBalancerError> {
        if backends.is_empty() {
            return Err(LoadBalancerError::NotEnoughBackends);
        }
        Ok(Self {
            counter: AtomicU64::new(0),
            backends,
        })
    }

    /// Number of backends in the pool.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false: construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl<T> LoadBalancer<T> for RoundRobin<T>
where
    T: Clone + Send + Sync,
{
    fn next(&self, ctx: &Context) -> Result<T, ContextError> {
        if let Err(err) = ctx.check() {
            metrics::record_cancelled_call(Strategy::RoundRobin);
            return Err(err);
        }

        let slot = self.counter.fetch_add(1, Ordering::Relaxed);
        let index = (slot % self.backends.len() as u64) as usize;

        tracing::trace!(slot, index, "Round robin selected backend");
        metrics::record_selection(Strategy::RoundRobin);
        Ok(self.backends[index].clone())
    }

    fn strategy(&self) -> Strategy {
        Strategy::RoundRobin
    }
}
