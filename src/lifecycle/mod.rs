//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Caller creates Context (context.rs)
//!     → passes it to LoadBalancer::next
//!     → balancer may park a release task on ctx.cancelled()
//!
//! CancelHandle::cancel / timeout / parent cancelled
//!     → every clone of the Context observes the same reason
//!     → parked release tasks wake and run once
//! ```
//!
//! # Design Decisions
//! - Cancellation is a one-way latch: once set it never clears
//! - Child contexts inherit cancellation, never the reverse

pub mod context;

pub use context::{CancelHandle, Context, ContextError};
