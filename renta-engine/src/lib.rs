//! RENTA Engine - Agent Identity Change Propagation & Undo
//!
//! An agent's `(name, phone)` pair is denormalized into tenant, earning,
//! and activity-log records. This crate owns the whole lifecycle of
//! changing that pair:
//! - local validation of a prospective batch
//! - conflict detection against every other persisted agent
//! - history-first propagation across the five collections
//! - time-boxed, idempotent batch undo
//! - drift discovery for partially-applied edits
//!
//! Everything is synchronous and caller-driven. Edits within a batch are
//! processed strictly sequentially so that at most one edit, and within it
//! one collection write, is ever in flight. Two concurrent batches are not
//! serialized against each other; the conflict check is advisory.

pub mod audit;
pub mod batches;
pub mod conflict;
pub mod metrics;
pub mod propagate;
pub mod undo;
pub mod validate;

pub use audit::{DriftEntry, DriftKind, DriftReport};
pub use batches::group_active;
pub use conflict::ConflictChecker;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use propagate::IdentityPropagator;
pub use undo::UndoEngine;
pub use validate::validate_batch;

use renta_core::{
    push_reason, BatchId, BatchReceipt, BatchView, EditBatch, EngineConfig, EngineResult,
    HistoryRecord, ProposedEdit, SubmitError, Timestamp, UndoError, UndoReceipt,
};
use renta_storage::DirectoryStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;

// ============================================================================
// EDIT ENGINE FACADE
// ============================================================================

/// The operations the surrounding dashboard calls.
///
/// The engine holds no mutable state of its own beyond counters; all
/// shared state lives behind the [`DirectoryStore`].
pub struct EditEngine {
    store: Arc<dyn DirectoryStore>,
    config: EngineConfig,
    metrics: Arc<EngineMetrics>,
}

impl EditEngine {
    /// Create an engine with the default configuration (24-hour window).
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn DirectoryStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current counter snapshot.
    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Submit a batch of identity edits.
    ///
    /// No-ops are dropped first; an all-no-op submission is `EmptyBatch`.
    /// Local validation and conflict checks both run before any write, and
    /// any rejection returns the full merged list without touching
    /// persistence. On a clean batch, each edit is propagated fully before
    /// the next begins. A propagation failure stops the loop and surfaces
    /// as `PropagationFailed`; already-applied edits stay applied.
    pub fn submit_batch(
        &self,
        edits: &[ProposedEdit],
        edited_by: &str,
        now: Timestamp,
    ) -> Result<BatchReceipt, SubmitError> {
        let effective: Vec<ProposedEdit> = edits
            .iter()
            .map(|e| e.normalized())
            .filter(|e| !e.is_noop())
            .collect();
        if effective.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let mut rejections = validate_batch(&effective);

        // Conflict-check only edits that passed local validation; the
        // checker itself skips edits that change nothing.
        let locally_clean: Vec<ProposedEdit> = effective
            .iter()
            .filter(|e| !rejections.iter().any(|r| r.agent_id == e.agent_id))
            .cloned()
            .collect();
        let checker = ConflictChecker::new(self.store.as_ref(), self.config.conflict_retry);
        for conflict in checker.check(&locally_clean) {
            for reason in conflict.reasons {
                push_reason(
                    &mut rejections,
                    conflict.agent_id,
                    &conflict.agent_name,
                    reason,
                );
            }
        }

        if !rejections.is_empty() {
            self.metrics.batches_rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                agents = rejections.len(),
                edited_by,
                "Batch rejected before persistence"
            );
            return Err(SubmitError::Rejected { rejections });
        }

        let batch = EditBatch::new(effective);
        let propagator = IdentityPropagator::new(self.store.as_ref());
        let total = batch.edits.len();
        for (applied, edit) in batch.edits.iter().enumerate() {
            if let Err(source) = propagator.apply_forward(batch.batch_id, edit, edited_by, now) {
                self.metrics
                    .propagation_failures
                    .fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    batch_id = %batch.batch_id,
                    applied,
                    total,
                    error = %source,
                    "Propagation failed partway; applied edits are left in place"
                );
                return Err(SubmitError::PropagationFailed {
                    batch_id: batch.batch_id,
                    applied,
                    total,
                    source,
                });
            }
        }

        self.metrics.batches_submitted.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .edits_applied
            .fetch_add(total as u64, Ordering::Relaxed);
        tracing::info!(
            batch_id = %batch.batch_id,
            applied = total,
            edited_by,
            "Edit batch applied"
        );
        Ok(BatchReceipt {
            batch_id: batch.batch_id,
            applied_count: total,
        })
    }

    /// Batches still eligible for undo, newest first, annotated with the
    /// derived window classification.
    pub fn list_undoable_batches(&self, now: Timestamp) -> EngineResult<Vec<BatchView>> {
        let window = self.config.undo_window();
        let active = self.store.history_list_active(now, window)?;
        Ok(group_active(active, now, window))
    }

    /// Undo one batch. See [`UndoEngine::undo`] for the rejection rules.
    pub fn undo_batch(&self, batch_id: BatchId, now: Timestamp) -> Result<UndoReceipt, UndoError> {
        let undo = UndoEngine::new(self.store.as_ref(), self.config.undo_window());
        match undo.undo(batch_id, now) {
            Ok(receipt) => {
                self.metrics.undos_completed.fetch_add(1, Ordering::Relaxed);
                Ok(receipt)
            }
            Err(err) => {
                self.metrics.undos_rejected.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Unfiltered history dump for audit and reporting, oldest first.
    pub fn export_history(&self) -> EngineResult<Vec<HistoryRecord>> {
        Ok(self.store.history_list_all()?)
    }

    /// Scan the denormalized collections for copies a partial propagation
    /// left inconsistent.
    pub fn drift_report(&self, now: Timestamp) -> EngineResult<DriftReport> {
        Ok(audit::scan(self.store.as_ref(), now)?)
    }
}
