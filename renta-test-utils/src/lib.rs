//! RENTA Test Utilities
//!
//! Centralized test infrastructure for the RENTA workspace:
//! - Record builders for agents, tenants, earnings, and activity entries
//! - A seeded MockStorage fixture with denormalized copies in sync

// Re-export mock storage from its source crate
pub use renta_storage::{FailurePoint, MockStorage};

use chrono::Utc;
use renta_core::{
    ActivityRecord, AgentIdentity, EarningRecord, ProposedEdit, TenantRecord,
};
use renta_storage::DirectoryStore;

/// Build an agent identity with a fresh id.
pub fn make_agent(name: &str, phone: &str) -> AgentIdentity {
    AgentIdentity::new(name, phone)
}

/// Build a tenant record tagged with the agent's identity snapshot.
pub fn make_tenant(tenant_name: &str, property: &str, agent: &AgentIdentity) -> TenantRecord {
    TenantRecord {
        tenant_id: renta_core::new_entity_id(),
        tenant_name: tenant_name.to_string(),
        property: property.to_string(),
        unit: "A1".to_string(),
        monthly_due: 38_000,
        agent_name: agent.name.clone(),
        agent_phone: agent.phone.clone(),
    }
}

/// Build an earnings record tagged with the agent's identity snapshot.
pub fn make_earning(period: &str, amount: i64, agent: &AgentIdentity) -> EarningRecord {
    EarningRecord {
        earning_id: renta_core::new_entity_id(),
        period: period.to_string(),
        amount,
        agent_name: agent.name.clone(),
        agent_phone: agent.phone.clone(),
    }
}

/// Build an activity-log record tagged with the agent's identity snapshot.
pub fn make_activity(action: &str, agent: &AgentIdentity) -> ActivityRecord {
    ActivityRecord {
        activity_id: renta_core::new_entity_id(),
        action: action.to_string(),
        detail: format!("{} by {}", action, agent.name),
        occurred_at: Utc::now(),
        metadata: None,
        agent_name: agent.name.clone(),
        agent_phone: agent.phone.clone(),
    }
}

/// Build an edit moving the agent to a new identity pair.
pub fn make_edit(agent: &AgentIdentity, new_name: &str, new_phone: &str) -> ProposedEdit {
    ProposedEdit {
        agent_id: agent.agent_id,
        original_name: agent.name.clone(),
        original_phone: agent.phone.clone(),
        new_name: new_name.to_string(),
        new_phone: new_phone.to_string(),
    }
}

/// A store seeded with three agents, each carrying tenants, earnings, and
/// activity entries whose snapshots are in sync with the profile. Returns
/// the store and the seeded agents (John, Jane, Kim).
pub fn fixture_store() -> (MockStorage, Vec<AgentIdentity>) {
    let store = MockStorage::new();
    let agents = vec![
        make_agent("John", "0700 111 222"),
        make_agent("Jane", "0700 333 444"),
        make_agent("Kim", "0700 555 666"),
    ];

    for agent in &agents {
        store.agent_insert(agent).expect("seed agent");
        store
            .tenant_insert(&make_tenant("Alice Tenant", "Sunrise Court", agent))
            .expect("seed tenant");
        store
            .tenant_insert(&make_tenant("Bob Tenant", "Acacia Flats", agent))
            .expect("seed tenant");
        store
            .earning_insert(&make_earning("2026-06", 12_500, agent))
            .expect("seed earning");
        store
            .earning_insert(&make_earning("2026-07", 14_000, agent))
            .expect("seed earning");
        store
            .activity_insert(&make_activity("collected rent", agent))
            .expect("seed activity");
        store
            .activity_insert(&make_activity("visited property", agent))
            .expect("seed activity");
    }

    (store, agents)
}
