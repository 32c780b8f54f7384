//! Least Connections load balancing strategy.
//!
//! # Responsibilities
//! - Pick the least used backend and attribute the caller to it atomically
//! - Release the attribution once the caller's context is cancelled
//!
//! # Design Decisions
//! - One coarse lock over the whole pool; pools are expected to be small
//! - The release is a cancellation hook on the caller's context; `next`
//!   never waits for it and needs no async runtime
//! - A context that is never cancelled holds its attribution forever

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::lifecycle::{Context, ContextError};
use crate::load_balancer::{backend::Backend, least_used_index, LoadBalancer, LoadBalancerError, Strategy};
use crate::observability::metrics;

type Pool<T> = Arc<Mutex<Vec<Backend<T>>>>;

/// Least connections selector over backends stored by value.
#[derive(Debug)]
pub struct LeastConns<T> {
    backends: Pool<T>,
}

impl<T> LeastConns<T> {
    /// Create a least connections balancer over a non-empty pool.
    pub fn new(backends: Vec<T>) -> Result<Self, LoadBalancerError> {
        if backends.is_empty() {
            return Err(LoadBalancerError::NotEnoughBackends);
        }
        let backends = backends.into_iter().map(Backend::new).collect();
        Ok(Self {
            backends: Arc::new(Mutex::new(backends)),
        })
    }

    /// Snapshot of in-flight counts, in pool order.
    pub fn in_flight(&self) -> Vec<u64> {
        lock(&self.backends).iter().map(Backend::in_flight).collect()
    }

    /// Number of backends in the pool.
    pub fn len(&self) -> usize {
        lock(&self.backends).len()
    }

    /// Always false: construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        lock(&self.backends).is_empty()
    }
}

impl<T> LoadBalancer<T> for LeastConns<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn next(&self, ctx: &Context) -> Result<T, ContextError> {
        if let Err(err) = ctx.check() {
            metrics::record_cancelled_call(Strategy::LeastConns);
            return Err(err);
        }

        let (index, selected) = {
            let mut backends = lock(&self.backends);
            let index = least_used_index(backends.iter().map(Backend::in_flight));
            let in_flight = backends[index].acquire();
            tracing::debug!(index, in_flight, "Least connections selected backend");
            (index, backends[index].value().clone())
        };
        metrics::record_selection(Strategy::LeastConns);
        metrics::record_acquired(Strategy::LeastConns);

        let backends = Arc::clone(&self.backends);
        ctx.after_cancel(move |reason| {
            let in_flight = lock(&backends)[index].release();
            metrics::record_released(Strategy::LeastConns);
            tracing::trace!(index, in_flight, %reason, "Released backend");
        });

        Ok(selected)
    }

    fn strategy(&self) -> Strategy {
        Strategy::LeastConns
    }
}

// Counts stay consistent even if a holder panicked, so poisoning is ignored.
fn lock<T>(backends: &Mutex<Vec<Backend<T>>>) -> MutexGuard<'_, Vec<Backend<T>>> {
    backends.lock().unwrap_or_else(PoisonError::into_inner)
}
