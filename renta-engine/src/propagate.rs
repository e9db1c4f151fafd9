//! Identity change propagation across the denormalized collections
//!
//! One directional apply per edit, best-effort sequential, no shared
//! transaction. Forward order is the crash-safety contract:
//!
//! 1. history record (the durable intent, always first)
//! 2. agent profile
//! 3. tenants
//! 4. earnings
//! 5. activity log
//!
//! A failure at step N leaves steps 1..N-1 applied and skips the rest;
//! the surviving history row is what makes the partial state discoverable.
//! Reverse applies are keyed by the recorded NEW phone (the value the
//! copies currently hold), write no history, and are idempotent.

use renta_core::{BatchId, HistoryRecord, ProposedEdit, StorageResult, Timestamp};
use renta_storage::{DirectoryStore, IdentityTarget};

pub struct IdentityPropagator<'a> {
    store: &'a dyn DirectoryStore,
}

impl<'a> IdentityPropagator<'a> {
    pub fn new(store: &'a dyn DirectoryStore) -> Self {
        Self { store }
    }

    /// Apply one edit forward. The history record is written before any
    /// collection is touched; on success it is returned for the caller's
    /// bookkeeping.
    pub fn apply_forward(
        &self,
        batch_id: BatchId,
        edit: &ProposedEdit,
        edited_by: &str,
        now: Timestamp,
    ) -> StorageResult<HistoryRecord> {
        let record = HistoryRecord::for_edit(batch_id, edit, edited_by, now);
        self.store.history_insert(&record)?;

        let target = IdentityTarget::new(edit.new_name.clone(), edit.new_phone.clone());
        self.store.agent_update_identity(edit.agent_id, &target)?;

        let from = edit.original_phone.as_str();
        let tenants = self.store.tenant_retag_by_phone(from, &target)?;
        let earnings = self.store.earning_retag_by_phone(from, &target)?;
        let activity = self.store.activity_retag_by_phone(from, &target)?;

        tracing::debug!(
            batch_id = %batch_id,
            agent_id = %edit.agent_id,
            tenants,
            earnings,
            activity,
            "Identity change propagated"
        );
        Ok(record)
    }

    /// Revert one recorded edit. Copies are matched by the recorded new
    /// phone, since they carry no agent id. Safe to repeat: anything
    /// already back at the old pair no longer matches and is skipped.
    pub fn apply_reverse(&self, record: &HistoryRecord) -> StorageResult<()> {
        let target = IdentityTarget::new(record.old_name.clone(), record.old_phone.clone());

        if let Some(agent) = self.store.agent_get(record.agent_id)? {
            if !agent.matches(&record.old_name, &record.old_phone) {
                self.store.agent_update_identity(record.agent_id, &target)?;
            }
        }

        let from = record.new_phone.as_str();
        let tenants = self.store.tenant_retag_by_phone(from, &target)?;
        let earnings = self.store.earning_retag_by_phone(from, &target)?;
        let activity = self.store.activity_retag_by_phone(from, &target)?;

        tracing::debug!(
            batch_id = %record.batch_id,
            agent_id = %record.agent_id,
            tenants,
            earnings,
            activity,
            "Identity change reverted"
        );
        Ok(())
    }
}
