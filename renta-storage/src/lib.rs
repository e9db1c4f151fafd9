//! RENTA Storage - Storage Trait and Mock Implementation
//!
//! Defines the storage abstraction over the five persisted collections:
//! agents, tenants, earnings, activity log, and edit history. Production
//! deployments back this with the remote document store; `MockStorage` is
//! the bundled in-memory implementation used by tests and local tooling.
//!
//! None of the write operations share a transaction. The engine's ordering
//! guarantees (history first, then agent, then each denormalized
//! collection) are the only atomicity on offer, which is why the trait
//! exposes narrow per-collection operations rather than a generic batch
//! write.

use chrono::Duration;
use renta_core::{
    ActivityRecord, AgentId, AgentIdentity, BatchId, Collection, EarningRecord, HistoryRecord,
    RecordId, StorageError, StorageResult, TenantRecord, Timestamp,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// The identity pair a write moves records to. Used both forward (new
/// identity) and in reverse (the recorded old identity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTarget {
    pub name: String,
    pub phone: String,
}

impl IdentityTarget {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for the RENTA collections.
///
/// `*_retag_by_phone` operations update the denormalized `(agent_name,
/// agent_phone)` snapshot on every record whose `agent_phone` equals the
/// given value, returning how many records were touched. The phone value is
/// the only link between an agent and its denormalized copies.
pub trait DirectoryStore: Send + Sync {
    // === Agent Operations ===

    /// Insert a new agent identity.
    fn agent_insert(&self, agent: &AgentIdentity) -> StorageResult<()>;

    /// Get an agent by ID.
    fn agent_get(&self, id: AgentId) -> StorageResult<Option<AgentIdentity>>;

    /// List all agents.
    fn agent_list(&self) -> StorageResult<Vec<AgentIdentity>>;

    /// Find an agent by name, case-insensitively.
    fn agent_find_by_name(&self, name: &str) -> StorageResult<Option<AgentIdentity>>;

    /// Find an agent by exact phone.
    fn agent_find_by_phone(&self, phone: &str) -> StorageResult<Option<AgentIdentity>>;

    /// Re-point an agent's identity pair.
    fn agent_update_identity(&self, id: AgentId, target: &IdentityTarget) -> StorageResult<()>;

    // === Tenant Operations ===

    /// Insert a new tenant record.
    fn tenant_insert(&self, tenant: &TenantRecord) -> StorageResult<()>;

    /// List all tenant records.
    fn tenant_list(&self) -> StorageResult<Vec<TenantRecord>>;

    /// Tenants whose denormalized agent phone equals `phone`.
    fn tenant_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<TenantRecord>>;

    /// Update the agent snapshot on every matching tenant record.
    fn tenant_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64>;

    // === Earning Operations ===

    /// Insert a new earnings record.
    fn earning_insert(&self, earning: &EarningRecord) -> StorageResult<()>;

    /// List all earnings records.
    fn earning_list(&self) -> StorageResult<Vec<EarningRecord>>;

    /// Earnings whose denormalized agent phone equals `phone`.
    fn earning_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<EarningRecord>>;

    /// Update the agent snapshot on every matching earnings record.
    fn earning_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64>;

    // === Activity Log Operations ===

    /// Insert a new activity-log record.
    fn activity_insert(&self, activity: &ActivityRecord) -> StorageResult<()>;

    /// List all activity-log records.
    fn activity_list(&self) -> StorageResult<Vec<ActivityRecord>>;

    /// Activity entries whose denormalized agent phone equals `phone`.
    fn activity_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<ActivityRecord>>;

    /// Update the agent snapshot on every matching activity record.
    fn activity_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64>;

    // === History Operations ===

    /// Insert a new history record with `undone_at = None`.
    fn history_insert(&self, record: &HistoryRecord) -> StorageResult<()>;

    /// Get a history record by ID.
    fn history_get(&self, id: RecordId) -> StorageResult<Option<HistoryRecord>>;

    /// All history records for one batch, oldest first.
    fn history_list_batch(&self, batch_id: BatchId) -> StorageResult<Vec<HistoryRecord>>;

    /// History records still active: not undone and inside the window.
    fn history_list_active(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> StorageResult<Vec<HistoryRecord>>;

    /// Unfiltered history dump for audit export, oldest first.
    fn history_list_all(&self) -> StorageResult<Vec<HistoryRecord>>;

    /// Set `undone_at` on every record of the batch. This is the only
    /// mutation ever applied to a history record after insert. Returns the
    /// number of records marked.
    fn history_mark_undone(&self, batch_id: BatchId, when: Timestamp) -> StorageResult<u64>;
}

// ============================================================================
// FAILURE INJECTION
// ============================================================================

/// Operations `MockStorage` can be told to fail, one shot each.
///
/// Each injected point is consumed by the first matching call, which
/// returns an `UpdateFailed`/`InsertFailed`/`QueryFailed` error as
/// appropriate. Inject the same point twice to fail two calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    AgentFindByName,
    AgentFindByPhone,
    AgentUpdate,
    TenantRetag,
    EarningRetag,
    ActivityRetag,
    HistoryInsert,
    HistoryMarkUndone,
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// In-memory storage for tests and local tooling.
#[derive(Debug, Default)]
pub struct MockStorage {
    agents: Arc<RwLock<HashMap<AgentId, AgentIdentity>>>,
    tenants: Arc<RwLock<HashMap<Uuid, TenantRecord>>>,
    earnings: Arc<RwLock<HashMap<Uuid, EarningRecord>>>,
    activity: Arc<RwLock<HashMap<Uuid, ActivityRecord>>>,
    history: Arc<RwLock<HashMap<RecordId, HistoryRecord>>>,
    failures: Arc<Mutex<Vec<FailurePoint>>>,
}

fn read<T>(lock: &RwLock<T>) -> StorageResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StorageError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> StorageResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StorageError::LockPoisoned)
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next call hitting `point` to fail.
    pub fn inject_failure(&self, point: FailurePoint) {
        self.failures
            .lock()
            .expect("failure list poisoned")
            .push(point);
    }

    /// Consume one pending failure for `point`, if any.
    fn trip(&self, point: FailurePoint) -> bool {
        let mut failures = self.failures.lock().expect("failure list poisoned");
        if let Some(pos) = failures.iter().position(|p| *p == point) {
            failures.remove(pos);
            true
        } else {
            false
        }
    }

    /// Clear all stored data and pending failures.
    pub fn clear(&self) {
        self.agents.write().map(|mut m| m.clear()).ok();
        self.tenants.write().map(|mut m| m.clear()).ok();
        self.earnings.write().map(|mut m| m.clear()).ok();
        self.activity.write().map(|mut m| m.clear()).ok();
        self.history.write().map(|mut m| m.clear()).ok();
        self.failures.lock().map(|mut v| v.clear()).ok();
    }

    /// Get count of stored agents.
    pub fn agent_count(&self) -> usize {
        self.agents.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Get count of stored tenant records.
    pub fn tenant_count(&self) -> usize {
        self.tenants.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Get count of stored earnings records.
    pub fn earning_count(&self) -> usize {
        self.earnings.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Get count of stored activity records.
    pub fn activity_count(&self) -> usize {
        self.activity.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Get count of stored history records.
    pub fn history_count(&self) -> usize {
        self.history.read().map(|m| m.len()).unwrap_or(0)
    }
}

impl DirectoryStore for MockStorage {
    // === Agent Operations ===

    fn agent_insert(&self, agent: &AgentIdentity) -> StorageResult<()> {
        let mut agents = write(&self.agents)?;
        if agents.contains_key(&agent.agent_id) {
            return Err(StorageError::InsertFailed {
                collection: Collection::Agents,
                reason: "already exists".to_string(),
            });
        }
        agents.insert(agent.agent_id, agent.clone());
        Ok(())
    }

    fn agent_get(&self, id: AgentId) -> StorageResult<Option<AgentIdentity>> {
        let agents = read(&self.agents)?;
        Ok(agents.get(&id).cloned())
    }

    fn agent_list(&self) -> StorageResult<Vec<AgentIdentity>> {
        let agents = read(&self.agents)?;
        Ok(agents.values().cloned().collect())
    }

    fn agent_find_by_name(&self, name: &str) -> StorageResult<Option<AgentIdentity>> {
        if self.trip(FailurePoint::AgentFindByName) {
            return Err(StorageError::QueryFailed {
                collection: Collection::Agents,
                reason: "injected failure".to_string(),
            });
        }
        let agents = read(&self.agents)?;
        Ok(agents
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    fn agent_find_by_phone(&self, phone: &str) -> StorageResult<Option<AgentIdentity>> {
        if self.trip(FailurePoint::AgentFindByPhone) {
            return Err(StorageError::QueryFailed {
                collection: Collection::Agents,
                reason: "injected failure".to_string(),
            });
        }
        let agents = read(&self.agents)?;
        Ok(agents.values().find(|a| a.phone == phone).cloned())
    }

    fn agent_update_identity(&self, id: AgentId, target: &IdentityTarget) -> StorageResult<()> {
        if self.trip(FailurePoint::AgentUpdate) {
            return Err(StorageError::UpdateFailed {
                collection: Collection::Agents,
                reason: "injected failure".to_string(),
            });
        }
        let mut agents = write(&self.agents)?;
        let agent = agents.get_mut(&id).ok_or(StorageError::NotFound {
            collection: Collection::Agents,
            id,
        })?;
        agent.name = target.name.clone();
        agent.phone = target.phone.clone();
        Ok(())
    }

    // === Tenant Operations ===

    fn tenant_insert(&self, tenant: &TenantRecord) -> StorageResult<()> {
        let mut tenants = write(&self.tenants)?;
        if tenants.contains_key(&tenant.tenant_id) {
            return Err(StorageError::InsertFailed {
                collection: Collection::Tenants,
                reason: "already exists".to_string(),
            });
        }
        tenants.insert(tenant.tenant_id, tenant.clone());
        Ok(())
    }

    fn tenant_list(&self) -> StorageResult<Vec<TenantRecord>> {
        let tenants = read(&self.tenants)?;
        Ok(tenants.values().cloned().collect())
    }

    fn tenant_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<TenantRecord>> {
        let tenants = read(&self.tenants)?;
        Ok(tenants
            .values()
            .filter(|t| t.agent_phone == phone)
            .cloned()
            .collect())
    }

    fn tenant_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64> {
        if self.trip(FailurePoint::TenantRetag) {
            return Err(StorageError::UpdateFailed {
                collection: Collection::Tenants,
                reason: "injected failure".to_string(),
            });
        }
        let mut tenants = write(&self.tenants)?;
        let mut updated = 0u64;
        for tenant in tenants.values_mut().filter(|t| t.agent_phone == phone) {
            tenant.agent_name = target.name.clone();
            tenant.agent_phone = target.phone.clone();
            updated += 1;
        }
        Ok(updated)
    }

    // === Earning Operations ===

    fn earning_insert(&self, earning: &EarningRecord) -> StorageResult<()> {
        let mut earnings = write(&self.earnings)?;
        if earnings.contains_key(&earning.earning_id) {
            return Err(StorageError::InsertFailed {
                collection: Collection::Earnings,
                reason: "already exists".to_string(),
            });
        }
        earnings.insert(earning.earning_id, earning.clone());
        Ok(())
    }

    fn earning_list(&self) -> StorageResult<Vec<EarningRecord>> {
        let earnings = read(&self.earnings)?;
        Ok(earnings.values().cloned().collect())
    }

    fn earning_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<EarningRecord>> {
        let earnings = read(&self.earnings)?;
        Ok(earnings
            .values()
            .filter(|e| e.agent_phone == phone)
            .cloned()
            .collect())
    }

    fn earning_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64> {
        if self.trip(FailurePoint::EarningRetag) {
            return Err(StorageError::UpdateFailed {
                collection: Collection::Earnings,
                reason: "injected failure".to_string(),
            });
        }
        let mut earnings = write(&self.earnings)?;
        let mut updated = 0u64;
        for earning in earnings.values_mut().filter(|e| e.agent_phone == phone) {
            earning.agent_name = target.name.clone();
            earning.agent_phone = target.phone.clone();
            updated += 1;
        }
        Ok(updated)
    }

    // === Activity Log Operations ===

    fn activity_insert(&self, activity: &ActivityRecord) -> StorageResult<()> {
        let mut log = write(&self.activity)?;
        if log.contains_key(&activity.activity_id) {
            return Err(StorageError::InsertFailed {
                collection: Collection::ActivityLog,
                reason: "already exists".to_string(),
            });
        }
        log.insert(activity.activity_id, activity.clone());
        Ok(())
    }

    fn activity_list(&self) -> StorageResult<Vec<ActivityRecord>> {
        let log = read(&self.activity)?;
        Ok(log.values().cloned().collect())
    }

    fn activity_query_by_agent_phone(&self, phone: &str) -> StorageResult<Vec<ActivityRecord>> {
        let log = read(&self.activity)?;
        Ok(log
            .values()
            .filter(|a| a.agent_phone == phone)
            .cloned()
            .collect())
    }

    fn activity_retag_by_phone(&self, phone: &str, target: &IdentityTarget) -> StorageResult<u64> {
        if self.trip(FailurePoint::ActivityRetag) {
            return Err(StorageError::UpdateFailed {
                collection: Collection::ActivityLog,
                reason: "injected failure".to_string(),
            });
        }
        let mut log = write(&self.activity)?;
        let mut updated = 0u64;
        for activity in log.values_mut().filter(|a| a.agent_phone == phone) {
            activity.agent_name = target.name.clone();
            activity.agent_phone = target.phone.clone();
            updated += 1;
        }
        Ok(updated)
    }

    // === History Operations ===

    fn history_insert(&self, record: &HistoryRecord) -> StorageResult<()> {
        if self.trip(FailurePoint::HistoryInsert) {
            return Err(StorageError::InsertFailed {
                collection: Collection::History,
                reason: "injected failure".to_string(),
            });
        }
        let mut history = write(&self.history)?;
        if history.contains_key(&record.record_id) {
            return Err(StorageError::InsertFailed {
                collection: Collection::History,
                reason: "already exists".to_string(),
            });
        }
        history.insert(record.record_id, record.clone());
        Ok(())
    }

    fn history_get(&self, id: RecordId) -> StorageResult<Option<HistoryRecord>> {
        let history = read(&self.history)?;
        Ok(history.get(&id).cloned())
    }

    fn history_list_batch(&self, batch_id: BatchId) -> StorageResult<Vec<HistoryRecord>> {
        let history = read(&self.history)?;
        let mut records: Vec<HistoryRecord> = history
            .values()
            .filter(|r| r.batch_id == batch_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.edited_at, a.record_id).cmp(&(b.edited_at, b.record_id)));
        Ok(records)
    }

    fn history_list_active(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> StorageResult<Vec<HistoryRecord>> {
        let history = read(&self.history)?;
        Ok(history
            .values()
            .filter(|r| !r.is_undone() && !r.is_expired(now, window))
            .cloned()
            .collect())
    }

    fn history_list_all(&self) -> StorageResult<Vec<HistoryRecord>> {
        let history = read(&self.history)?;
        let mut records: Vec<HistoryRecord> = history.values().cloned().collect();
        records.sort_by(|a, b| (a.edited_at, a.record_id).cmp(&(b.edited_at, b.record_id)));
        Ok(records)
    }

    fn history_mark_undone(&self, batch_id: BatchId, when: Timestamp) -> StorageResult<u64> {
        if self.trip(FailurePoint::HistoryMarkUndone) {
            return Err(StorageError::UpdateFailed {
                collection: Collection::History,
                reason: "injected failure".to_string(),
            });
        }
        let mut history = write(&self.history)?;
        let mut marked = 0u64;
        for record in history.values_mut().filter(|r| r.batch_id == batch_id) {
            record.undone_at = Some(when);
            marked += 1;
        }
        Ok(marked)
    }
}

// ============================================================================
// TESTS
// ============================================================================
