//! Denormalized record types
//!
//! Tenant, earning, and activity-log records each carry a snapshot of the
//! responsible agent's `(name, phone)` pair. These are independently
//! mutable copies, not foreign keys; the propagator keeps them in sync.

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted collection discriminator for errors and audit reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Agents,
    Tenants,
    Earnings,
    ActivityLog,
    History,
}

/// A tenant under management, tagged with its collection agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub property: String,
    pub unit: String,
    /// Monthly rent due, in minor currency units.
    pub monthly_due: i64,
    pub agent_name: String,
    pub agent_phone: String,
}

/// One agent earnings entry for a collection period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningRecord {
    pub earning_id: Uuid,
    /// Collection period, e.g. "2026-07".
    pub period: String,
    /// Amount earned, in minor currency units.
    pub amount: i64,
    pub agent_name: String,
    pub agent_phone: String,
}

/// One agent activity-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_id: Uuid,
    pub action: String,
    pub detail: String,
    pub occurred_at: Timestamp,
    /// Free-form payload attached by the producing feature.
    pub metadata: Option<serde_json::Value>,
    pub agent_name: String,
    pub agent_phone: String,
}
