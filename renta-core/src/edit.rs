//! Agent identities and proposed identity edits
//!
//! An agent's identity is its `(name, phone)` pair. The pair is copied into
//! tenant, earning, and activity-log records as a denormalized snapshot, so
//! a rename is never a single-row update.

use crate::{AgentId, BatchId};
use serde::{Deserialize, Serialize};

/// A collection agent as persisted in the `agents` collection.
///
/// `agent_id` is the immutable primary key. `name` and `phone` are the
/// mutable attributes that exist as denormalized copies elsewhere. Across
/// all live identities, `name` is unique case-insensitively and `phone` is
/// unique literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: AgentId,
    pub name: String,
    pub phone: String,
}

impl AgentIdentity {
    /// Create an identity with a fresh id.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            agent_id: crate::new_entity_id(),
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Whether this identity currently carries the given pair.
    /// Names compare case-insensitively, phones literally.
    pub fn matches(&self, name: &str, phone: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.phone == phone
    }
}

/// One proposed identity change, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedEdit {
    pub agent_id: AgentId,
    pub original_name: String,
    pub original_phone: String,
    pub new_name: String,
    pub new_phone: String,
}

impl ProposedEdit {
    /// True when the edit changes nothing. Names compare case-sensitively
    /// here: a case-only rename ("JOHN" -> "John") is a real edit that must
    /// propagate to the denormalized copies.
    pub fn is_noop(&self) -> bool {
        self.new_name == self.original_name && self.new_phone == self.original_phone
    }

    /// Whether the name changes for conflict purposes (case-insensitive).
    pub fn changes_name(&self) -> bool {
        !self.new_name.eq_ignore_ascii_case(&self.original_name)
    }

    /// Whether the phone changes (literal compare).
    pub fn changes_phone(&self) -> bool {
        self.new_phone != self.original_phone
    }

    /// Copy of this edit with the new fields trimmed. Submission normalizes
    /// edits before validation so that persisted values never carry
    /// operator whitespace.
    pub fn normalized(&self) -> Self {
        Self {
            agent_id: self.agent_id,
            original_name: self.original_name.clone(),
            original_phone: self.original_phone.clone(),
            new_name: self.new_name.trim().to_string(),
            new_phone: self.new_phone.trim().to_string(),
        }
    }
}

/// The unit of atomicity from the operator's perspective: the edits that
/// survived no-op filtering, under one fresh batch id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBatch {
    pub batch_id: BatchId,
    pub edits: Vec<ProposedEdit>,
}

impl EditBatch {
    pub fn new(edits: Vec<ProposedEdit>) -> Self {
        Self {
            batch_id: crate::new_entity_id(),
            edits,
        }
    }
}

/// Returned by a successful batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub batch_id: BatchId,
    pub applied_count: usize,
}

/// Returned by a successful batch undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoReceipt {
    pub batch_id: BatchId,
    pub reverted_count: usize,
}
