//! Time-boxed batch reversal
//!
//! A batch is reversible while every one of its history records is still
//! active (`undone_at == None`) and the submission is inside the undo
//! window. Reverts run strictly sequentially; the terminal `undone_at`
//! marker is written once for the whole batch, only after every record has
//! been reverted. A failed revert leaves the batch active and retryable.

use crate::propagate::IdentityPropagator;
use chrono::Duration;
use renta_core::{BatchId, Timestamp, UndoError, UndoReceipt};
use renta_storage::DirectoryStore;

pub struct UndoEngine<'a> {
    store: &'a dyn DirectoryStore,
    window: Duration,
}

impl<'a> UndoEngine<'a> {
    pub fn new(store: &'a dyn DirectoryStore, window: Duration) -> Self {
        Self { store, window }
    }

    /// Undo a whole batch.
    ///
    /// Rejections, in check order:
    /// - `UnknownBatch`: no history rows carry this id
    /// - `AlreadyUndone`: the terminal marker is already set
    /// - `WindowExpired`: the submission is at or past `edited_at + window`
    ///   (the expiry instant itself is expired)
    /// - `Superseded`: some agent in the batch no longer carries the
    ///   identity this batch moved it to (a newer batch re-pointed it), and
    ///   is not already back at the old pair from a previous partial undo
    pub fn undo(&self, batch_id: BatchId, now: Timestamp) -> Result<UndoReceipt, UndoError> {
        let records = self.store.history_list_batch(batch_id)?;
        if records.is_empty() {
            return Err(UndoError::UnknownBatch { batch_id });
        }
        if let Some(undone_at) = records.iter().find_map(|r| r.undone_at) {
            return Err(UndoError::AlreadyUndone {
                batch_id,
                undone_at,
            });
        }

        // Records are sorted oldest first; the earliest bounds the window.
        let earliest = &records[0];
        if earliest.is_expired(now, self.window) {
            tracing::warn!(
                batch_id = %batch_id,
                edited_at = %earliest.edited_at,
                "Undo rejected: window expired"
            );
            return Err(UndoError::WindowExpired {
                batch_id,
                expired_at: earliest.expires_at(self.window),
            });
        }

        // Copies are matched by phone value alone, so reverting a batch
        // whose agent has since been renamed again would revert records the
        // newer batch owns. Reject unless each live agent still carries the
        // identity this batch produced, or is already back at the old pair
        // (idempotent retry after a failed undo).
        for record in &records {
            let agent = self.store.agent_get(record.agent_id)?;
            let revertible = agent.as_ref().map_or(false, |a| {
                a.matches(&record.new_name, &record.new_phone)
                    || a.matches(&record.old_name, &record.old_phone)
            });
            if !revertible {
                let detail = match agent {
                    Some(a) => format!("agent now carries \"{}\" / {}", a.name, a.phone),
                    None => "agent no longer exists".to_string(),
                };
                tracing::warn!(
                    batch_id = %batch_id,
                    agent_id = %record.agent_id,
                    detail = %detail,
                    "Undo rejected: batch superseded"
                );
                return Err(UndoError::Superseded {
                    batch_id,
                    agent_id: record.agent_id,
                    detail,
                });
            }
        }

        let propagator = IdentityPropagator::new(self.store);
        let total = records.len();
        for (reverted, record) in records.iter().enumerate() {
            if let Err(source) = propagator.apply_reverse(record) {
                tracing::error!(
                    batch_id = %batch_id,
                    agent_id = %record.agent_id,
                    reverted,
                    total,
                    error = %source,
                    "Undo failed partway; batch stays active for retry"
                );
                return Err(UndoError::RevertFailed {
                    batch_id,
                    reverted,
                    total,
                    source,
                });
            }
        }

        // Terminal marker for the whole batch, only now.
        self.store.history_mark_undone(batch_id, now)?;
        tracing::info!(batch_id = %batch_id, reverted = total, "Batch undone");
        Ok(UndoReceipt {
            batch_id,
            reverted_count: total,
        })
    }
}
