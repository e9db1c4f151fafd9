//! Read-side grouping of history records into batch views

use chrono::Duration;
use renta_core::{BatchView, HistoryRecord, Timestamp};
use std::collections::HashMap;

/// Group active history records by batch, newest submission first, each
/// annotated with the derived window classification. The batch timestamp
/// is the earliest record's `edited_at` (records in a batch share one
/// submission instant in practice; the earliest is the conservative bound
/// for expiry).
pub fn group_active(records: Vec<HistoryRecord>, now: Timestamp, window: Duration) -> Vec<BatchView> {
    let mut by_batch: HashMap<_, Vec<HistoryRecord>> = HashMap::new();
    for record in records {
        by_batch.entry(record.batch_id).or_default().push(record);
    }

    let mut views: Vec<BatchView> = by_batch
        .into_iter()
        .map(|(batch_id, mut records)| {
            records.sort_by(|a, b| (a.edited_at, a.record_id).cmp(&(b.edited_at, b.record_id)));
            let first = &records[0];
            let expired = first.is_expired(now, window);
            let hours_remaining = first.hours_remaining(now, window);
            BatchView {
                batch_id,
                edited_by: first.edited_by.clone(),
                edited_at: first.edited_at,
                agent_count: records.len(),
                expired,
                hours_remaining,
                records,
            }
        })
        .collect();

    views.sort_by(|a, b| b.edited_at.cmp(&a.edited_at));
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use renta_core::{new_entity_id, AgentIdentity, ProposedEdit};

    fn make_record(batch_id: uuid::Uuid, edited_at: Timestamp) -> HistoryRecord {
        let agent = AgentIdentity::new("John", "0700");
        let edit = ProposedEdit {
            agent_id: agent.agent_id,
            original_name: agent.name,
            original_phone: agent.phone,
            new_name: "Johnny".to_string(),
            new_phone: "0700".to_string(),
        };
        HistoryRecord::for_edit(batch_id, &edit, "admin@renta", edited_at)
    }

    #[test]
    fn test_groups_by_batch_with_counts() {
        let now = Utc::now();
        let window = Duration::hours(24);
        let batch_a = new_entity_id();
        let batch_b = new_entity_id();

        let records = vec![
            make_record(batch_a, now - Duration::hours(2)),
            make_record(batch_a, now - Duration::hours(2)),
            make_record(batch_b, now - Duration::hours(1)),
        ];

        let views = group_active(records, now, window);
        assert_eq!(views.len(), 2);
        // Newest submission first.
        assert_eq!(views[0].batch_id, batch_b);
        assert_eq!(views[0].agent_count, 1);
        assert_eq!(views[1].batch_id, batch_a);
        assert_eq!(views[1].agent_count, 2);
    }

    #[test]
    fn test_views_carry_window_annotations() {
        let now = Utc::now();
        let window = Duration::hours(24);
        let batch = new_entity_id();
        let views = group_active(
            vec![make_record(batch, now - Duration::hours(20))],
            now,
            window,
        );
        assert!(!views[0].expired);
        assert_eq!(views[0].hours_remaining, 4);
    }
}
