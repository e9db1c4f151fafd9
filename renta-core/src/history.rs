//! Edit history records and batch views
//!
//! One `HistoryRecord` is persisted per edited agent per batch, written
//! before any denormalized copy is touched. Records are append-only: the
//! single mutation ever applied after insert is setting `undone_at`, which
//! is terminal. Expiry is a read-time classification derived from
//! `edited_at` plus the undo window; it is never stored.

use crate::{AgentId, BatchId, ProposedEdit, RecordId, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Persisted audit row for one agent's identity change within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub record_id: RecordId,
    pub batch_id: BatchId,
    pub agent_id: AgentId,
    pub old_name: String,
    pub old_phone: String,
    pub new_name: String,
    pub new_phone: String,
    pub edited_by: String,
    pub edited_at: Timestamp,
    /// `None` while the record is still reversible (subject to the window
    /// check); `Some` is terminal.
    pub undone_at: Option<Timestamp>,
}

impl HistoryRecord {
    /// Build the record for an edit about to be applied.
    pub fn for_edit(
        batch_id: BatchId,
        edit: &ProposedEdit,
        edited_by: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            record_id: crate::new_entity_id(),
            batch_id,
            agent_id: edit.agent_id,
            old_name: edit.original_name.clone(),
            old_phone: edit.original_phone.clone(),
            new_name: edit.new_name.clone(),
            new_phone: edit.new_phone.clone(),
            edited_by: edited_by.into(),
            edited_at: now,
            undone_at: None,
        }
    }

    pub fn is_undone(&self) -> bool {
        self.undone_at.is_some()
    }

    /// Instant at which the undo window closes.
    pub fn expires_at(&self, window: Duration) -> Timestamp {
        self.edited_at + window
    }

    /// Whether the record's undo window has closed. The expiry instant
    /// itself counts as expired: `now >= edited_at + window`.
    pub fn is_expired(&self, now: Timestamp, window: Duration) -> bool {
        now >= self.expires_at(window)
    }

    /// Whole hours remaining before expiry, rounded up, clamped at zero.
    /// Display-oriented: a batch with 30 minutes left shows 1 hour.
    pub fn hours_remaining(&self, now: Timestamp, window: Duration) -> i64 {
        let remaining = self.expires_at(window) - now;
        let minutes = remaining.num_minutes();
        if minutes <= 0 {
            0
        } else {
            (minutes + 59) / 60
        }
    }
}

/// Read-side grouping of a batch's active history records, annotated with
/// the derived window classification for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchView {
    pub batch_id: BatchId,
    pub edited_by: String,
    pub edited_at: Timestamp,
    pub agent_count: usize,
    pub records: Vec<HistoryRecord>,
    pub expired: bool,
    pub hours_remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_record(edited_at: Timestamp) -> HistoryRecord {
        HistoryRecord {
            record_id: crate::new_entity_id(),
            batch_id: crate::new_entity_id(),
            agent_id: crate::new_entity_id(),
            old_name: "John".to_string(),
            old_phone: "0700 111 222".to_string(),
            new_name: "Johnny".to_string(),
            new_phone: "0700 111 222".to_string(),
            edited_by: "admin@renta".to_string(),
            edited_at,
            undone_at: None,
        }
    }

    #[test]
    fn test_window_open_just_inside_boundary() {
        let now = Utc::now();
        let window = Duration::hours(24);
        let record = make_record(now - Duration::hours(23) - Duration::minutes(59));
        assert!(!record.is_expired(now, window));
    }

    #[test]
    fn test_window_closed_just_outside_boundary() {
        let now = Utc::now();
        let window = Duration::hours(24);
        let record = make_record(now - Duration::hours(24) - Duration::minutes(1));
        assert!(record.is_expired(now, window));
    }

    #[test]
    fn test_exact_expiry_instant_is_expired() {
        let now = Utc::now();
        let window = Duration::hours(24);
        let record = make_record(now - Duration::hours(24));
        assert!(record.is_expired(now, window));
    }

    #[test]
    fn test_hours_remaining_rounds_up() {
        let now = Utc::now();
        let window = Duration::hours(24);

        let half_hour_left = make_record(now - Duration::hours(23) - Duration::minutes(30));
        assert_eq!(half_hour_left.hours_remaining(now, window), 1);

        let fresh = make_record(now);
        assert_eq!(fresh.hours_remaining(now, window), 24);

        let expired = make_record(now - Duration::hours(25));
        assert_eq!(expired.hours_remaining(now, window), 0);
    }
}
