//! Cooperative cancellation.
//! A cheap, cloneable flag handed by reference into every long-running step.
//! Long-running loops call `is_set()` at their checkpoints and stop early.
//!
//! Notes:
//! - Clones share the same flag, so a requester on another thread (Ctrl-C
//!   handler, UI) can hold one clone while the worker holds another.
//! - `request()` is safe to call from signal handlers.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative cancellation (idempotent).
    #[inline]
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Clear any pending request. Called once at the start of every run.
    #[inline]
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
