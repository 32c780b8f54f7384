//! Cancellable request context.
//!
//! A [`Context`] carries a single cancellation signal plus the reason it
//! fired. Clones share state, so a context handed to other work observes
//! the same cancellation as the caller's copy.
//!
//! # Design Decisions
//! - Backed by a `watch` channel: async waiters are woken, never polled
//! - Callbacks registered with `after_cancel` run on the cancelling thread,
//!   so no executor is required
//! - First cancellation reason wins; later cancels are no-ops
//! - A context that is never cancelled keeps its waiters parked forever

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Reason a context was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContextError {
    /// Cancelled through its [`CancelHandle`] or a cancelled parent.
    #[error("context canceled")]
    Canceled,

    /// The context's timeout elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

type CancelHook = Box<dyn FnOnce(ContextError) + Send>;

struct State {
    reason: watch::Sender<Option<ContextError>>,
    // Also serializes setting `reason`, so a hook is either queued before
    // cancellation or run by its registrant.
    hooks: Mutex<Vec<CancelHook>>,
}

impl State {
    fn new() -> Self {
        let (reason, _) = watch::channel(None);
        Self {
            reason,
            hooks: Mutex::new(Vec::new()),
        }
    }

    fn hooks(&self) -> MutexGuard<'_, Vec<CancelHook>> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn err(&self) -> Option<ContextError> {
        *self.reason.borrow()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("reason", &self.err())
            .field("hooks", &self.hooks().len())
            .finish()
    }
}

/// A cancellation signal shared between a caller and any work done on its behalf.
#[derive(Debug, Clone)]
pub struct Context {
    state: Arc<State>,
}

/// Cancels the [`Context`] it was created alongside.
///
/// Dropping the handle does not cancel the context.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<State>,
}

impl Context {
    /// A context that is never cancelled.
    pub fn background() -> Self {
        Self {
            state: Arc::new(State::new()),
        }
    }

    /// A fresh context plus the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let ctx = Self::background();
        let handle = CancelHandle {
            state: Arc::clone(&ctx.state),
        };
        (ctx, handle)
    }

    /// A context cancelled with [`ContextError::DeadlineExceeded`] after `timeout`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        let (ctx, handle) = Self::with_cancel();
        let state = Arc::downgrade(&ctx.state);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel_weak(&state, ContextError::DeadlineExceeded);
        });
        (ctx, handle)
    }

    /// Derive a context that is also cancelled when `self` is.
    ///
    /// The child inherits the parent's cancellation reason. Cancelling the
    /// child never touches the parent.
    pub fn child(&self) -> (Self, CancelHandle) {
        let (child, handle) = Self::with_cancel();
        let weak_child = Arc::downgrade(&child.state);
        self.after_cancel(move |reason| cancel_weak(&weak_child, reason));
        (child, handle)
    }

    /// Run `f` once, with the cancellation reason, when the context is cancelled.
    ///
    /// Runs `f` immediately on the calling thread if the context is already
    /// cancelled; otherwise it runs on whichever thread cancels. Never runs
    /// if the context is never cancelled.
    pub fn after_cancel<F>(&self, f: F)
    where
        F: FnOnce(ContextError) + Send + 'static,
    {
        let mut hooks = self.state.hooks();
        match self.state.err() {
            Some(reason) => {
                drop(hooks);
                f(reason);
            }
            None => hooks.push(Box::new(f)),
        }
    }

    /// The cancellation reason, or `None` while the context is live.
    pub fn err(&self) -> Option<ContextError> {
        self.state.err()
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// `Err` with the cancellation reason if the context is cancelled.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Resolve once the context is cancelled.
    ///
    /// Returns immediately for an already-cancelled context and never
    /// resolves for one that is never cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.reason.subscribe();
        // Errors only once every sender is gone, at which point nobody can cancel.
        let _ = rx.wait_for(Option::is_some).await;
    }
}

impl CancelHandle {
    /// Cancel the context with [`ContextError::Canceled`].
    pub fn cancel(&self) {
        cancel_state(&self.state, ContextError::Canceled);
    }

    /// Whether the paired context has been cancelled, for any reason.
    pub fn is_cancelled(&self) -> bool {
        self.state.err().is_some()
    }
}

fn cancel_state(state: &State, reason: ContextError) {
    let hooks = {
        let mut hooks = state.hooks();
        let modified = state.reason.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if !modified {
            return;
        }
        std::mem::take(&mut *hooks)
    };
    for hook in hooks {
        hook(reason);
    }
}

fn cancel_weak(state: &Weak<State>, reason: ContextError) {
    if let Some(state) = state.upgrade() {
        cancel_state(&state, reason);
    }
}
