//! Privacy event notifications
//!
//! Observers subscribe through a broadcast channel rather than hooking an
//! emitter: `PrivacyEnforcer::subscribe` hands out a receiver, and slow
//! receivers lag rather than block the decision path.

use crate::audit::{AuditEntry, Violation};
use crate::taxonomy::PrivacyLevel;
use serde::Serialize;

/// Notification emitted by the enforcement engine
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PrivacyEvent {
    /// An audit entry was appended to the ledger
    AuditLogged(AuditEntry),
    /// An access was denied or carried violations
    AccessDenied(AuditEntry),
    /// A violation record was created
    ViolationRecorded(Violation),
    /// An entity's cached privacy level changed
    #[serde(rename_all = "camelCase")]
    LevelChanged {
        entity_id: String,
        level: PrivacyLevel,
        user_id: String,
    },
}
