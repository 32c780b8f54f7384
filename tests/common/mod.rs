//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

/// Per-backend selection counts gathered by a test caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCounts<T: Eq + Hash>(HashMap<T, usize>);

impl<T: Eq + Hash> BackendCounts<T> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn inc(&mut self, backend: T) {
        *self.0.entry(backend).or_default() += 1;
    }

    pub fn get(&self, backend: &T) -> usize {
        self.0.get(backend).copied().unwrap_or(0)
    }

    pub fn merge(&mut self, other: BackendCounts<T>) {
        for (backend, count) in other.0 {
            *self.0.entry(backend).or_default() += count;
        }
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl<T: Eq + Hash> Default for BackendCounts<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> FromIterator<(T, usize)> for BackendCounts<T> {
    fn from_iter<I: IntoIterator<Item = (T, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Poll `check` until it returns true or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
