//! Buffered audit ledger with periodic flush
//!
//! Decisions are appended to in-memory buffers so the decision path never
//! waits on storage. A timer task flushes the buffers on an interval;
//! `flush` swaps the buffers out under their locks, so appends racing the
//! swap land in the fresh buffer and are never lost. Each swapped record
//! is persisted independently — a failed write is logged and re-buffered
//! for the next flush, never dropped and never blocking sibling writes.
//!
//! There is no crash-durability for buffered-but-unflushed records:
//! callers must invoke `shutdown` before process exit.

use crate::audit::storage::AuditStorage;
use crate::audit::types::{
    AccessRecord, AuditAction, AuditEntry, AuditStatistics, Violation, ViolationRecord,
};
use crate::error::Result;
use crate::events::PrivacyEvent;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Buffered recorder of access decisions and violations
pub struct AuditLedger {
    storage: Arc<dyn AuditStorage>,
    entries: Mutex<Vec<AuditEntry>>,
    violations: Mutex<Vec<Violation>>,
    events: broadcast::Sender<PrivacyEvent>,
    flush_interval: Duration,
    flush_task: Mutex<Option<JoinHandle<()>>>,
}

impl AuditLedger {
    /// Create a ledger over the given storage collaborator
    pub fn new(
        storage: Arc<dyn AuditStorage>,
        flush_interval: Duration,
        events: broadcast::Sender<PrivacyEvent>,
    ) -> Self {
        Self {
            storage,
            entries: Mutex::new(Vec::new()),
            violations: Mutex::new(Vec::new()),
            events,
            flush_interval,
            flush_task: Mutex::new(None),
        }
    }

    /// Start the periodic flush timer. Replaces any previous timer.
    pub async fn start_flush_timer(self: &Arc<Self>) {
        let ledger = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(ledger.flush_interval);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                ledger.flush().await;
            }
        });

        let mut task = self.flush_task.lock().await;
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Record one access decision.
    ///
    /// Appends to the buffer and notifies observers; a deny or an entry
    /// carrying violations additionally raises an [`PrivacyEvent::AccessDenied`]
    /// notification.
    pub async fn log_access(&self, record: AccessRecord) -> AuditEntry {
        let entry = AuditEntry {
            id: format!("aud-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            entity_id: record.entity_id,
            entity_kind: record.entity_kind,
            action: record.action,
            provider: record.provider,
            level: record.level,
            was_filtered: record.was_filtered,
            violations: record.violations,
            user_id: record.user_id,
        };

        self.entries.lock().await.push(entry.clone());

        let _ = self.events.send(PrivacyEvent::AuditLogged(entry.clone()));
        if entry.action == AuditAction::Deny || !entry.violations.is_empty() {
            let _ = self.events.send(PrivacyEvent::AccessDenied(entry.clone()));
        }

        entry
    }

    /// Record one violation
    pub async fn log_violation(&self, record: ViolationRecord) -> Violation {
        let violation = Violation {
            id: format!("vio-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            entity_id: record.entity_id,
            rule: record.rule,
            severity: record.severity,
            description: record.description,
            provider: record.provider,
        };

        self.violations.lock().await.push(violation.clone());
        let _ = self
            .events
            .send(PrivacyEvent::ViolationRecorded(violation.clone()));

        violation
    }

    /// Persist everything currently buffered.
    ///
    /// Flushing an empty buffer is a no-op. Writes are issued
    /// independently and complete in no particular order; failures are
    /// re-buffered for the next flush.
    pub async fn flush(&self) {
        let drained_entries = {
            let mut buffer = self.entries.lock().await;
            std::mem::take(&mut *buffer)
        };
        let drained_violations = {
            let mut buffer = self.violations.lock().await;
            std::mem::take(&mut *buffer)
        };

        if drained_entries.is_empty() && drained_violations.is_empty() {
            return;
        }

        let entry_writes = drained_entries.into_iter().map(|entry| {
            let storage = Arc::clone(&self.storage);
            async move {
                match storage.save_entry(entry.clone()).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            entry_id = %entry.id,
                            "Failed to persist audit entry, re-buffering: {}",
                            e
                        );
                        Some(entry)
                    }
                }
            }
        });
        let violation_writes = drained_violations.into_iter().map(|violation| {
            let storage = Arc::clone(&self.storage);
            async move {
                match storage.save_violation(violation.clone()).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            violation_id = %violation.id,
                            "Failed to persist violation, re-buffering: {}",
                            e
                        );
                        Some(violation)
                    }
                }
            }
        });

        let (entry_failures, violation_failures) =
            tokio::join!(join_all(entry_writes), join_all(violation_writes));

        let failed_entries: Vec<AuditEntry> = entry_failures.into_iter().flatten().collect();
        if !failed_entries.is_empty() {
            self.entries.lock().await.extend(failed_entries);
        }
        let failed_violations: Vec<Violation> =
            violation_failures.into_iter().flatten().collect();
        if !failed_violations.is_empty() {
            self.violations.lock().await.extend(failed_violations);
        }
    }

    /// Audit trail for an entity (`""` = all), flushing buffered entries
    /// first so nothing in flight is missed
    pub async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditEntry>> {
        self.flush().await;
        self.storage.audit_trail(entity_id).await
    }

    /// Violations, optionally scoped to an entity, flushing first
    pub async fn violations(&self, entity_id: Option<&str>) -> Result<Vec<Violation>> {
        self.flush().await;
        self.storage.violations(entity_id).await
    }

    /// Aggregate statistics over the full history
    pub async fn statistics(&self) -> Result<AuditStatistics> {
        self.flush().await;
        let entries = self.storage.audit_trail("").await?;
        let violations = self.storage.violations(None).await?;

        let mut stats = AuditStatistics::zeroed();
        stats.total_accesses = entries.len() as u64;
        stats.total_violations = violations.len() as u64;
        for entry in &entries {
            if entry.action == AuditAction::Deny {
                stats.total_denials += 1;
            }
            if entry.was_filtered {
                stats.total_filtered += 1;
            }
            *stats.by_provider.entry(entry.provider).or_insert(0) += 1;
            *stats.by_level.entry(entry.level).or_insert(0) += 1;
        }

        Ok(stats)
    }

    /// Buffered (not yet persisted) entry and violation counts
    pub async fn pending(&self) -> (usize, usize) {
        let entries = self.entries.lock().await.len();
        let violations = self.violations.lock().await.len();
        (entries, violations)
    }

    /// Cancel the flush timer, then flush one final time.
    ///
    /// The timer is aborted before the final flush so the two cannot race.
    pub async fn shutdown(&self) {
        if let Some(task) = self.flush_task.lock().await.take() {
            task.abort();
        }
        self.flush().await;
    }
}
