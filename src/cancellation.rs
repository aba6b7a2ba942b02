//! Cooperative cancellation shared between a host and its running scans.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Signals cancellation to long-running operations.
///
/// Cloneable and thread-safe; every clone observes the same flag. Scans and
/// aggregations check the token at their natural suspension points (between
/// scheduling steps, between file reads), so cancellation is honored promptly
/// but never preempts an in-progress read.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the token to cancelled. All clones observe the change.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once `cancel()` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
