//! RENTA Core - Entity Types
//!
//! Pure data structures with no behavior beyond derived attributes. All
//! other crates depend on this. This crate contains ONLY data types and the
//! window arithmetic they carry - no storage, no I/O.

pub mod config;
pub mod edit;
pub mod error;
pub mod history;
pub mod identity;
pub mod records;

pub use config::EngineConfig;
pub use edit::{AgentIdentity, BatchReceipt, EditBatch, ProposedEdit, UndoReceipt};
pub use error::{
    push_reason, EditRejection, EngineError, EngineResult, StorageError, StorageResult,
    SubmitError, UndoError,
};
pub use history::{BatchView, HistoryRecord};
pub use identity::{new_entity_id, AgentId, BatchId, RecordId, Timestamp};
pub use records::{ActivityRecord, Collection, EarningRecord, TenantRecord};
