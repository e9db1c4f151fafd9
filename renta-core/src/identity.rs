//! Identifier and timestamp types for RENTA entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Agent identifier using UUIDv7 for timestamp-sortable IDs.
pub type AgentId = Uuid;

/// Edit batch identifier. One per submission, shared by every history
/// record the submission produced.
pub type BatchId = Uuid;

/// History record identifier.
pub type RecordId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 identifier (timestamp-sortable).
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}
