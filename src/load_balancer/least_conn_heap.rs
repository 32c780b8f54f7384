//! Least Connections over individually allocated backend records.
//!
//! Same selection and release semantics as [`LeastConns`](super::LeastConns).
//! The release hook keeps a pointer to the chosen record instead of its
//! index into the pool.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::lifecycle::{Context, ContextError};
use crate::load_balancer::{backend::SharedBackend, least_used_index, LoadBalancer, LoadBalancerError, Strategy};
use crate::observability::metrics;

type Records<T> = Vec<Arc<SharedBackend<T>>>;

/// Least connections selector over shared backend records.
#[derive(Debug)]
pub struct LeastConnsHeap<T> {
    backends: Arc<Mutex<Records<T>>>,
}

impl<T> LeastConnsHeap<T> {
    pub fn new(backends: Vec<T>) -> Result<Self, LoadBalancerError> {
        if backends.is_empty() {
            return Err(LoadBalancerError::NotEnoughBackends);
        }
        let records = backends
            .into_iter()
            .map(|b| Arc::new(SharedBackend::new(b)))
            .collect();
        Ok(Self {
            backends: Arc::new(Mutex::new(records)),
        })
    }

    /// Snapshot of in-flight counts, in pool order.
    pub fn in_flight(&self) -> Vec<u64> {
        lock(&self.backends).iter().map(|b| b.in_flight()).collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.backends).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.backends).is_empty()
    }

    /// The record with the least attributed callers.
    fn least_used(records: &Records<T>) -> Arc<SharedBackend<T>> {
        let index = least_used_index(records.iter().map(|b| b.in_flight()));
        Arc::clone(&records[index])
    }
}

impl<T> LoadBalancer<T> for LeastConnsHeap<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn next(&self, ctx: &Context) -> Result<T, ContextError> {
        if let Err(err) = ctx.check() {
            metrics::record_cancelled_call(Strategy::LeastConnsHeap);
            return Err(err);
        }

        let least_used = {
            let records = lock(&self.backends);
            let least_used = Self::least_used(&records);
            let in_flight = least_used.acquire();
            tracing::debug!(in_flight, "Least connections (heap) selected backend");
            least_used
        };
        metrics::record_selection(Strategy::LeastConnsHeap);
        metrics::record_acquired(Strategy::LeastConnsHeap);

        let backends = Arc::clone(&self.backends);
        let record = Arc::clone(&least_used);
        ctx.after_cancel(move |reason| {
            let in_flight = {
                let _records = lock(&backends);
                record.release()
            };
            metrics::record_released(Strategy::LeastConnsHeap);
            tracing::trace!(in_flight, %reason, "Released backend");
        });

        Ok(least_used.value().clone())
    }

    fn strategy(&self) -> Strategy {
        Strategy::LeastConnsHeap
    }
}

fn lock<T>(backends: &Mutex<Records<T>>) -> MutexGuard<'_, Records<T>> {
    backends.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_matches_linear_variant_order() {
        let lc = LeastConnsHeap::new(vec!["backend-1", "backend-2", "backend-3"]).unwrap();

        let (ctx1, cancel1) = Context::with_cancel();
        let (ctx2, _cancel2) = Context::with_cancel();
        let (ctx3, _cancel3) = Context::with_cancel();
        assert_eq!(lc.next(&ctx1).unwrap(), "backend-1");
        assert_eq!(lc.next(&ctx2).unwrap(), "backend-2");
        assert_eq!(lc.next(&ctx3).unwrap(), "backend-3");

        cancel1.cancel();
        for _ in 0..100 {
            if lc.in_flight() == [0, 1, 1] {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(lc.in_flight(), vec![0, 1, 1]);

        let (ctx4, _cancel4) = Context::with_cancel();
        assert_eq!(lc.next(&ctx4).unwrap(), "backend-1");
    }

    #[tokio::test]
    async fn test_scan_stops_at_first_improvement() {
        let lc = LeastConnsHeap::new(vec!["a", "b", "c"]).unwrap();
        {
            let records = lock(&lc.backends);
            records[0].acquire();
            records[1].acquire();
            records[1].acquire();
        }

        let ctx = Context::background();
        assert_eq!(lc.next(&ctx).unwrap(), "c");
        assert_eq!(lc.in_flight(), vec![1, 2, 1]);
    }
}
