//! Engine counters
//!
//! Process-lifetime counters exposed for the host's metrics endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for edit-engine operations.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Batches applied end to end
    pub batches_submitted: AtomicU64,

    /// Batches rejected by validation or conflict checks
    pub batches_rejected: AtomicU64,

    /// Individual edits fully propagated
    pub edits_applied: AtomicU64,

    /// Batches left partially applied by a propagation failure
    pub propagation_failures: AtomicU64,

    /// Batches fully reverted and marked undone
    pub undos_completed: AtomicU64,

    /// Undo attempts rejected or failed
    pub undos_rejected: AtomicU64,
}

impl EngineMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all counters.
    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            edits_applied: self.edits_applied.load(Ordering::Relaxed),
            propagation_failures: self.propagation_failures.load(Ordering::Relaxed),
            undos_completed: self.undos_completed.load(Ordering::Relaxed),
            undos_rejected: self.undos_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of engine counters at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMetricsSnapshot {
    pub batches_submitted: u64,
    pub batches_rejected: u64,
    pub edits_applied: u64,
    pub propagation_failures: u64,
    pub undos_completed: u64,
    pub undos_rejected: u64,
}
