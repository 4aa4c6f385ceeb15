//! Audit storage collaborator interface and in-memory reference backend

use crate::audit::types::{AuditEntry, Violation};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Persistent store for audit entries and violations.
///
/// The ledger is storage-agnostic: each record is persisted independently,
/// and read paths return newest-first. An `entity_id` of `""` on
/// [`audit_trail`](AuditStorage::audit_trail) means "all entities".
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Persist one audit entry
    async fn save_entry(&self, entry: AuditEntry) -> Result<()>;

    /// Persist one violation
    async fn save_violation(&self, violation: Violation) -> Result<()>;

    /// Entries for an entity (`""` = all), descending timestamp
    async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditEntry>>;

    /// Violations, optionally scoped to an entity, descending timestamp
    async fn violations(&self, entity_id: Option<&str>) -> Result<Vec<Violation>>;
}

/// In-memory audit storage for tests and embedded use
pub struct MemoryAuditStorage {
    entries: RwLock<Vec<AuditEntry>>,
    violations: RwLock<Vec<Violation>>,
}

impl MemoryAuditStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            violations: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Number of stored violations
    pub async fn violation_count(&self) -> usize {
        self.violations.read().await.len()
    }
}

impl Default for MemoryAuditStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditStorage for MemoryAuditStorage {
    async fn save_entry(&self, entry: AuditEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn save_violation(&self, violation: Violation) -> Result<()> {
        self.violations.write().await.push(violation);
        Ok(())
    }

    async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditEntry>> {
        let entries = self.entries.read().await;
        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| entity_id.is_empty() || entry.entity_id == entity_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matched)
    }

    async fn violations(&self, entity_id: Option<&str>) -> Result<Vec<Violation>> {
        let violations = self.violations.read().await;
        let mut matched: Vec<Violation> = violations
            .iter()
            .filter(|violation| entity_id.map_or(true, |id| violation.entity_id == id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matched)
    }
}
