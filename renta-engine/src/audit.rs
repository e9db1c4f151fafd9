//! Denormalized-copy drift scan
//!
//! Read-only discovery pass for partially-applied edits: any copy whose
//! phone matches no live agent, or whose name contradicts the agent that
//! phone belongs to, is drift needing a reconciliation pass. The scan
//! never mutates anything; fixing drift is an operator decision.

use renta_core::{AgentIdentity, Collection, StorageResult, Timestamp};
use renta_storage::DirectoryStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// How a denormalized copy disagrees with the live agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftKind {
    /// The copy's phone matches no live agent.
    Orphaned,
    /// The phone matches an agent, but the copied name contradicts it.
    NameMismatch,
}

/// One drifted denormalized copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftEntry {
    pub collection: Collection,
    pub record_id: Uuid,
    pub agent_name: String,
    pub agent_phone: String,
    pub kind: DriftKind,
    /// The live agent's name, for `NameMismatch` entries.
    pub expected_name: Option<String>,
}

/// Result of one drift scan across the three denormalized collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: Timestamp,
    pub scanned: usize,
    pub entries: Vec<DriftEntry>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan every denormalized copy against the live agent set.
pub fn scan(store: &dyn DirectoryStore, now: Timestamp) -> StorageResult<DriftReport> {
    let agents = store.agent_list()?;
    let by_phone: HashMap<&str, &AgentIdentity> =
        agents.iter().map(|a| (a.phone.as_str(), a)).collect();

    let mut entries = Vec::new();
    let mut scanned = 0usize;

    for tenant in store.tenant_list()? {
        scanned += 1;
        classify(
            &by_phone,
            Collection::Tenants,
            tenant.tenant_id,
            &tenant.agent_name,
            &tenant.agent_phone,
            &mut entries,
        );
    }
    for earning in store.earning_list()? {
        scanned += 1;
        classify(
            &by_phone,
            Collection::Earnings,
            earning.earning_id,
            &earning.agent_name,
            &earning.agent_phone,
            &mut entries,
        );
    }
    for activity in store.activity_list()? {
        scanned += 1;
        classify(
            &by_phone,
            Collection::ActivityLog,
            activity.activity_id,
            &activity.agent_name,
            &activity.agent_phone,
            &mut entries,
        );
    }

    if !entries.is_empty() {
        tracing::warn!(
            drifted = entries.len(),
            scanned,
            "Drift scan found inconsistent denormalized copies"
        );
    }
    Ok(DriftReport {
        generated_at: now,
        scanned,
        entries,
    })
}

fn classify(
    by_phone: &HashMap<&str, &AgentIdentity>,
    collection: Collection,
    record_id: Uuid,
    agent_name: &str,
    agent_phone: &str,
    entries: &mut Vec<DriftEntry>,
) {
    match by_phone.get(agent_phone) {
        None => entries.push(DriftEntry {
            collection,
            record_id,
            agent_name: agent_name.to_string(),
            agent_phone: agent_phone.to_string(),
            kind: DriftKind::Orphaned,
            expected_name: None,
        }),
        Some(agent) if !agent.name.eq_ignore_ascii_case(agent_name) => {
            entries.push(DriftEntry {
                collection,
                record_id,
                agent_name: agent_name.to_string(),
                agent_phone: agent_phone.to_string(),
                kind: DriftKind::NameMismatch,
                expected_name: Some(agent.name.clone()),
            })
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use renta_storage::IdentityTarget;
    use renta_test_utils::fixture_store;

    #[test]
    fn test_quiescent_store_is_clean() {
        let (store, _) = fixture_store();
        let report = scan(&store, Utc::now()).unwrap();
        assert!(report.is_clean());
        assert!(report.scanned > 0);
    }

    #[test]
    fn test_orphaned_copies_reported() {
        let (store, agents) = fixture_store();
        // Re-point the agent profile without sweeping the copies, the
        // signature a propagation left behind when it died after step 2.
        store
            .agent_update_identity(
                agents[0].agent_id,
                &IdentityTarget::new("Johnny", "0799 000 000"),
            )
            .unwrap();

        let report = scan(&store, Utc::now()).unwrap();
        assert!(!report.is_clean());
        assert!(report
            .entries
            .iter()
            .all(|e| e.kind == DriftKind::Orphaned && e.agent_phone == agents[0].phone));
    }

    #[test]
    fn test_name_mismatch_reported_with_expected_name() {
        let (store, agents) = fixture_store();
        // Rename without changing phone, again skipping the copy sweep.
        store
            .agent_update_identity(
                agents[0].agent_id,
                &IdentityTarget::new("Johnny", agents[0].phone.clone()),
            )
            .unwrap();

        let report = scan(&store, Utc::now()).unwrap();
        assert!(!report.is_clean());
        for entry in &report.entries {
            assert_eq!(entry.kind, DriftKind::NameMismatch);
            assert_eq!(entry.expected_name.as_deref(), Some("Johnny"));
        }
    }
}
