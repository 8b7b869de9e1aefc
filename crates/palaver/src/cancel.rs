//! Cooperative cancellation for in-flight turns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag for aborting an in-flight turn.
///
/// The orchestrator checks the token before every gateway call; a cancelled
/// turn ends with [`TurnError::Cancelled`](crate::TurnError::Cancelled) and
/// the usual abort transition (busy cleared, history untouched past the user
/// message). Cancellation is cooperative: a gateway call or tool handler
/// already in progress runs to completion before the check fires.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent; affects every clone of the token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
