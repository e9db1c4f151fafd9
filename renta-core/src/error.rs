//! Error types for RENTA operations

use crate::{AgentId, BatchId, Collection, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {collection:?} with id {id}")]
    NotFound { collection: Collection, id: Uuid },

    #[error("Insert failed for {collection:?}: {reason}")]
    InsertFailed { collection: Collection, reason: String },

    #[error("Update failed for {collection:?}: {reason}")]
    UpdateFailed { collection: Collection, reason: String },

    #[error("Query failed for {collection:?}: {reason}")]
    QueryFailed { collection: Collection, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-agent aggregation of validation and conflict reasons, returned to
/// the caller in place of any persistence effect. Reasons are merged per
/// agent, never duplicated textually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRejection {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub reasons: Vec<String>,
}

/// Append `reason` to the rejection for `agent_id`, creating the rejection
/// if the agent has none yet. Duplicate reason strings are dropped.
pub fn push_reason(
    rejections: &mut Vec<EditRejection>,
    agent_id: AgentId,
    agent_name: &str,
    reason: String,
) {
    if let Some(existing) = rejections.iter_mut().find(|r| r.agent_id == agent_id) {
        if !existing.reasons.contains(&reason) {
            existing.reasons.push(reason);
        }
        return;
    }
    rejections.push(EditRejection {
        agent_id,
        agent_name: agent_name.to_string(),
        reasons: vec![reason],
    });
}

/// Batch submission errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    #[error("Batch contained no effective edits")]
    EmptyBatch,

    #[error("Batch rejected: {} agent(s) failed validation", rejections.len())]
    Rejected { rejections: Vec<EditRejection> },

    /// Propagation stopped partway. The already-applied edits and the
    /// failing edit's history row are left in place for reconciliation;
    /// nothing is rolled back.
    #[error("Propagation failed in batch {batch_id} after {applied} of {total} edit(s): {source}")]
    PropagationFailed {
        batch_id: BatchId,
        applied: usize,
        total: usize,
        source: StorageError,
    },
}

/// Batch undo errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UndoError {
    #[error("Unknown batch: {batch_id}")]
    UnknownBatch { batch_id: BatchId },

    #[error("Batch {batch_id} was already undone at {undone_at}")]
    AlreadyUndone {
        batch_id: BatchId,
        undone_at: Timestamp,
    },

    /// Business-rule rejection, not retryable: the undo window has closed.
    #[error("Undo window for batch {batch_id} closed at {expired_at}")]
    WindowExpired {
        batch_id: BatchId,
        expired_at: Timestamp,
    },

    /// A newer batch has re-pointed an agent since this batch was applied;
    /// reverting by the recorded phone value would clobber the newer edit.
    #[error("Batch {batch_id} superseded by a newer edit of agent {agent_id}: {detail}")]
    Superseded {
        batch_id: BatchId,
        agent_id: AgentId,
        detail: String,
    },

    /// A revert sub-step failed. The batch stays active; the undo may be
    /// retried because reverts are idempotent.
    #[error("Undo of batch {batch_id} failed after {reverted} of {total} revert(s): {source}")]
    RevertFailed {
        batch_id: BatchId,
        reverted: usize,
        total: usize,
        source: StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Master error type for all RENTA operations.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Undo error: {0}")]
    Undo(#[from] UndoError),
}

/// Result type alias for RENTA operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// TESTS
// =============================================================================
