//! Per-worker delivery counters
//!
//! Updated by a recorder worker, read through its handle. Strictly
//! observational: retirement decisions travel over the event channel, never
//! through these counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Delivery counters for one recorder worker
///
/// `failed` counts transient record errors (including the one that triggered
/// retirement); deadline overruns are tracked separately as `abandoned` since
/// they indicate a stuck destination rather than a rejecting one.
#[derive(Debug, Default)]
pub struct RecorderMetrics {
    queue_len: AtomicUsize,
    recorded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    abandoned: AtomicU64,
}

impl RecorderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub(crate) fn job_recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn job_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn job_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn job_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of one worker's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub recorded: u64,
    pub failed: u64,
    pub dropped: u64,
    pub abandoned: u64,
}
