//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Snapshot emitted between search chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    pub completed: u32,
    pub total: u32,
}

impl ProgressUpdate {
    /// Completion of the current attempt, 0..=100.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed as u64 * 100) / self.total as u64).min(100) as u32
    }
}

/// Receives progress updates from a running optimization.
pub trait ProgressSink {
    fn report(&mut self, update: ProgressUpdate);
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _update: ProgressUpdate) {}
}

/// Adapts a closure into a sink.
pub struct ProgressFn<F>(pub F);

impl<F: FnMut(ProgressUpdate)> ProgressSink for ProgressFn<F> {
    fn report(&mut self, update: ProgressUpdate) {
        (self.0)(update)
    }
}

/// Shared flag checked between search chunks. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
