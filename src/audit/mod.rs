//! Audit trail for privacy decisions
//!
//! Provides the buffered ledger that records every access decision and
//! violation, the storage collaborator interface it flushes into, and two
//! reference storage backends (in-memory and JSON-file).

pub mod json;
pub mod ledger;
pub mod storage;
pub mod types;

pub use json::JsonFileStorage;
pub use ledger::AuditLedger;
pub use storage::{AuditStorage, MemoryAuditStorage};
pub use types::{
    AccessRecord, AuditAction, AuditEntry, AuditStatistics, Severity, Violation, ViolationRecord,
};
