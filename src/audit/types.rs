//! Audit record types
//!
//! Entries and violations are immutable once created: the ledger assigns
//! ids and timestamps server-side, so callers hand in the record shapes
//! (`AccessRecord` / `ViolationRecord`) and get the finished values back.

use crate::taxonomy::{AiProvider, PrivacyLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What an audit entry records about the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Content passed through unmodified
    Access,
    /// Content passed through after redaction
    Filter,
    /// Access was refused
    Deny,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Filter => write!(f, "filter"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Immutable record of one access decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub entity_id: String,
    pub entity_kind: String,
    pub action: AuditAction,
    pub provider: AiProvider,
    pub level: PrivacyLevel,
    pub was_filtered: bool,
    pub violations: Vec<String>,
    pub user_id: String,
}

/// Input shape for [`AuditEntry`] — id and timestamp are ledger-generated
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub entity_id: String,
    pub entity_kind: String,
    pub action: AuditAction,
    pub provider: AiProvider,
    pub level: PrivacyLevel,
    pub was_filtered: bool,
    pub violations: Vec<String>,
    pub user_id: String,
}

/// Immutable record of a denied or flagged access attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub entity_id: String,
    /// Joined ids of the rules that produced the violation
    pub rule: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub provider: Option<AiProvider>,
}

/// Input shape for [`Violation`]
#[derive(Debug, Clone)]
pub struct ViolationRecord {
    pub entity_id: String,
    pub rule: String,
    pub severity: Severity,
    pub description: String,
    pub provider: Option<AiProvider>,
}

/// Aggregated view over the full audit history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatistics {
    pub total_accesses: u64,
    pub total_denials: u64,
    pub total_filtered: u64,
    pub total_violations: u64,
    pub by_provider: HashMap<AiProvider, u64>,
    pub by_level: HashMap<PrivacyLevel, u64>,
}

impl AuditStatistics {
    /// Statistics with every provider and level bucket present at zero
    pub fn zeroed() -> Self {
        Self {
            total_accesses: 0,
            total_denials: 0,
            total_filtered: 0,
            total_violations: 0,
            by_provider: AiProvider::ALL.iter().map(|p| (*p, 0)).collect(),
            by_level: PrivacyLevel::ALL.iter().map(|l| (*l, 0)).collect(),
        }
    }
}

impl Default for AuditStatistics {
    fn default() -> Self {
        Self::zeroed()
    }
}
