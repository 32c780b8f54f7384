//! Backend records.
//!
//! # Responsibilities
//! - Pair a backend value with its in-flight count
//! - Keep counts non-negative: every acquire is matched by one release
//!
//! Both record types are only mutated while the owning pool's lock is held.

use std::sync::atomic::{AtomicU64, Ordering};

/// A backend stored by value inside the pool.
#[derive(Debug, Clone)]
pub struct Backend<T> {
    value: T,
    in_flight: u64,
}

impl<T> Backend<T> {
    pub fn new(value: T) -> Self {
        Self { value, in_flight: 0 }
    }

    /// The backend identifier.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Callers currently attributed to this backend.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Attribute one more caller; returns the new count.
    pub fn acquire(&mut self) -> u64 {
        self.in_flight += 1;
        self.in_flight
    }

    /// Release one caller; returns the new count.
    pub fn release(&mut self) -> u64 {
        debug_assert!(self.in_flight > 0, "released a backend with no callers");
        self.in_flight = self.in_flight.saturating_sub(1);
        self.in_flight
    }
}

#[cfg(test)]
impl<T> Backend<T> {
    pub(crate) fn with_in_flight(value: T, in_flight: u64) -> Self {
        Self { value, in_flight }
    }
}

/// A backend allocated on its own so background tasks can hold onto it.
///
/// The count is atomic only to allow mutation through a shared pointer;
/// callers still serialize acquire and release behind the pool lock.
#[derive(Debug)]
pub struct SharedBackend<T> {
    value: T,
    in_flight: AtomicU64,
}

impl<T> SharedBackend<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            in_flight: AtomicU64::new(0),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn acquire(&self) -> u64 {
        self.in_flight.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn release(&self) -> u64 {
        let prev = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        debug_assert!(prev > 0, "released a backend with no callers");
        prev.saturating_sub(1)
    }
}
