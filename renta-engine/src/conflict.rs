//! Conflict detection against the persisted store
//!
//! Checks a locally-valid batch against every OTHER persisted agent. The
//! check is advisory: it reflects store state at call time and does not
//! lock anything, so two concurrent batches racing on the same phone can
//! both pass. A lookup that fails is retried a bounded number of times and
//! then surfaces as a blocking "could not verify" rejection rather than a
//! false clean.

use renta_core::{push_reason, AgentIdentity, EditRejection, ProposedEdit, StorageResult};
use renta_storage::DirectoryStore;

pub struct ConflictChecker<'a> {
    store: &'a dyn DirectoryStore,
    retry: u32,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(store: &'a dyn DirectoryStore, retry: u32) -> Self {
        Self { store, retry }
    }

    /// Check every edit that actually changes identity. Returns merged
    /// per-agent rejections, same shape as local validation.
    pub fn check(&self, edits: &[ProposedEdit]) -> Vec<EditRejection> {
        let mut rejections = Vec::new();

        for edit in edits {
            if edit.changes_name() {
                match self.lookup(|| self.store.agent_find_by_name(edit.new_name.trim())) {
                    Ok(Some(other)) if other.agent_id != edit.agent_id => {
                        push_reason(
                            &mut rejections,
                            edit.agent_id,
                            &edit.original_name,
                            format!("name \"{}\" already exists", edit.new_name.trim()),
                        );
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(
                            agent_id = %edit.agent_id,
                            error = %err,
                            "Name conflict lookup failed after retry"
                        );
                        push_reason(
                            &mut rejections,
                            edit.agent_id,
                            &edit.original_name,
                            format!(
                                "could not verify name \"{}\"; retry the submission",
                                edit.new_name.trim()
                            ),
                        );
                    }
                }
            }

            if edit.changes_phone() {
                match self.lookup(|| self.store.agent_find_by_phone(edit.new_phone.trim())) {
                    Ok(Some(other)) if other.agent_id != edit.agent_id => {
                        push_reason(
                            &mut rejections,
                            edit.agent_id,
                            &edit.original_name,
                            format!(
                                "phone \"{}\" already belongs to agent \"{}\"",
                                edit.new_phone.trim(),
                                other.name
                            ),
                        );
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(
                            agent_id = %edit.agent_id,
                            error = %err,
                            "Phone conflict lookup failed after retry"
                        );
                        push_reason(
                            &mut rejections,
                            edit.agent_id,
                            &edit.original_name,
                            format!(
                                "could not verify phone \"{}\"; retry the submission",
                                edit.new_phone.trim()
                            ),
                        );
                    }
                }
            }
        }

        rejections
    }

    /// Run a lookup, retrying up to `retry` extra times on failure.
    fn lookup<F>(&self, query: F) -> StorageResult<Option<AgentIdentity>>
    where
        F: Fn() -> StorageResult<Option<AgentIdentity>>,
    {
        let mut last = query();
        for _ in 0..self.retry {
            if last.is_ok() {
                break;
            }
            last = query();
        }
        last
    }
}
