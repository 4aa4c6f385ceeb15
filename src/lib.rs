//! MindGate - Privacy enforcement boundary for personal knowledge AI
//!
//! MindGate sits between a personal knowledge store and external AI
//! inference providers. Given a piece of content and a requesting
//! provider, it decides whether access is permitted, whether the content
//! must be redacted first, and it records every decision for audit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PrivacyEnforcer                         │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │  Level Cache │   │    Policy    │   │   Rule Engine  │  │
//! │  │  entity →    │   │   Registry   │   │  ordered walk, │  │
//! │  │  level       │   │  provider →  │   │  deny short-   │  │
//! │  │              │   │  policy      │   │  circuits      │  │
//! │  └──────┬───────┘   └──────┬───────┘   └───────┬────────┘  │
//! │         │                  │                   │           │
//! │         └────────────┬─────┴───────────────────┘           │
//! │                      │                                     │
//! │  ┌───────────────────▼──────────────┐   ┌───────────────┐  │
//! │  │          Content Filter          │   │  Audit Ledger │  │
//! │  │  per-level regex redaction       │   │  buffered,    │  │
//! │  │  with a fixed [REDACTED] token   │   │  timed flush  │  │
//! │  └──────────────────────────────────┘   └───────┬───────┘  │
//! └─────────────────────────────────────────────────┼──────────┘
//!                                                   │
//!                                       ┌───────────▼──────────┐
//!                                       │     AuditStorage     │
//!                                       │  memory / JSON files │
//!                                       └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! Any caller about to send entity content to an inference endpoint must
//! call [`PrivacyEnforcer::process_for_ai`] first, substitute the entity's
//! content with the returned `content` if allowed, and abort otherwise.
//! Call [`PrivacyEnforcer::shutdown`] before process exit so buffered
//! audit records reach storage.
//!
//! ## Modules
//!
//! - [`service`]: the enforcement orchestrator
//! - [`rules`]: ordered condition→action privacy rules
//! - [`filter`]: pattern-based content redaction by privacy level
//! - [`policy`]: provider policy registry
//! - [`audit`]: buffered audit ledger and storage backends
//! - [`taxonomy`]: privacy levels, provider identities, content shapes
//! - [`events`]: observer notifications
//! - [`config`]: enforcement configuration

pub mod audit;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod policy;
pub mod rules;
pub mod service;
pub mod taxonomy;

pub use audit::{
    AuditAction, AuditEntry, AuditLedger, AuditStatistics, AuditStorage, JsonFileStorage,
    MemoryAuditStorage, Severity, Violation,
};
pub use config::EnforcerConfig;
pub use error::{Error, Result};
pub use events::PrivacyEvent;
pub use filter::{ContentFilter, FilterOutcome, REDACTION_TOKEN};
pub use policy::{PolicyBuilder, PolicyRegistry, ProviderPolicy};
pub use rules::{FnCheck, Rule, RuleAction, RuleCheck, RuleDecision, RuleEngine};
pub use service::{PrivacyEnforcer, ProcessOutcome};
pub use taxonomy::{AccessContext, AiProvider, ContentEntity, PrivacyLevel};
