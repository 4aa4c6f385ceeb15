//! Privacy enforcement service
//!
//! The single entry point AI-integration callers use before sending
//! content to an inference endpoint: resolve the entity's privacy level,
//! evaluate the rules, redact if required, and record the decision.
//!
//! Every call moves through `Start → LevelResolved → RuleEvaluated →
//! {Denied | Filtered | Allowed}`; each terminal state queues exactly one
//! audit entry before the call returns. Persistence happens off the
//! decision path via the ledger's flush cycle.

use crate::audit::{
    AccessRecord, AuditAction, AuditLedger, AuditStorage, Severity, ViolationRecord,
};
use crate::config::EnforcerConfig;
use crate::error::Result;
use crate::events::PrivacyEvent;
use crate::filter::ContentFilter;
use crate::policy::{PolicyRegistry, ProviderPolicy};
use crate::rules::{RuleAction, RuleEngine};
use crate::taxonomy::{AccessContext, AiProvider, ContentEntity, PrivacyLevel};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Result of processing content for an AI provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    /// Whether the content may be sent at all
    pub allowed: bool,
    /// The content to send — redacted if `filtered`, empty if denied
    pub content: String,
    /// Whether redaction was applied
    pub filtered: bool,
    /// Violation descriptions for a denied request
    pub violations: Vec<String>,
}

/// Orchestrator composing the policy registry, rule engine, content
/// filter, level cache, and audit ledger
pub struct PrivacyEnforcer {
    config: EnforcerConfig,
    levels: RwLock<HashMap<String, PrivacyLevel>>,
    policies: RwLock<PolicyRegistry>,
    rules: RuleEngine,
    filter: ContentFilter,
    ledger: Arc<AuditLedger>,
    events: broadcast::Sender<PrivacyEvent>,
}

impl PrivacyEnforcer {
    /// Create an enforcer with the default configuration
    pub async fn new(storage: Arc<dyn AuditStorage>) -> Result<Self> {
        Self::with_config(storage, EnforcerConfig::default()).await
    }

    /// Create an enforcer with the given configuration.
    ///
    /// Seeds the default provider policies, rules and redaction patterns,
    /// and starts the periodic audit flush timer.
    pub async fn with_config(
        storage: Arc<dyn AuditStorage>,
        config: EnforcerConfig,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(config.event_capacity);
        let ledger = Arc::new(AuditLedger::new(
            storage,
            config.flush_interval(),
            events.clone(),
        ));
        ledger.start_flush_timer().await;

        Ok(Self {
            levels: RwLock::new(HashMap::new()),
            policies: RwLock::new(PolicyRegistry::with_defaults()),
            rules: RuleEngine::with_default_rules()?,
            filter: ContentFilter::with_defaults()?,
            ledger,
            events,
            config,
        })
    }

    /// Cache a privacy level for an entity, overriding anything the entity
    /// declares. Last write wins; no audit entry is written.
    pub async fn set_privacy_level(&self, entity_id: &str, level: PrivacyLevel, user_id: &str) {
        self.levels
            .write()
            .await
            .insert(entity_id.to_string(), level);
        let _ = self.events.send(PrivacyEvent::LevelChanged {
            entity_id: entity_id.to_string(),
            level,
            user_id: user_id.to_string(),
        });
        tracing::debug!(entity_id = %entity_id, level = %level, "Privacy level updated");
    }

    /// Resolve an entity's privacy level: cached value, then declared
    /// level, then the configured fail-safe default
    pub async fn privacy_level(&self, entity: &ContentEntity) -> PrivacyLevel {
        if let Some(level) = self.levels.read().await.get(&entity.id) {
            return *level;
        }
        entity.declared_level.unwrap_or(self.config.default_level)
    }

    /// Pure, unaudited access check.
    ///
    /// A provider without a registered policy is denied; a level outside
    /// the policy's allowed set is denied; otherwise the rule engine
    /// decides.
    pub async fn can_access(
        &self,
        entity: &ContentEntity,
        provider: AiProvider,
        user_id: &str,
    ) -> bool {
        let level = self.privacy_level(entity).await;

        {
            let policies = self.policies.read().await;
            let Some(policy) = policies.get(provider) else {
                tracing::debug!(provider = %provider, "No policy registered, denying access");
                return false;
            };
            if !policy.allows(level) {
                return false;
            }
        }

        let ctx = AccessContext {
            provider,
            user_id: user_id.to_string(),
            level,
        };
        self.rules.evaluate(entity, &ctx).await.allowed
    }

    /// The audited entry point: decide, redact if required, and record.
    ///
    /// Callers must substitute the entity's content with the returned
    /// `content` before sending anything to an inference endpoint.
    pub async fn process_for_ai(
        &self,
        entity: &ContentEntity,
        provider: AiProvider,
        user_id: &str,
    ) -> ProcessOutcome {
        let level = self.privacy_level(entity).await;
        let ctx = AccessContext {
            provider,
            user_id: user_id.to_string(),
            level,
        };
        let decision = self.rules.evaluate(entity, &ctx).await;

        if !decision.allowed {
            let denial = "Access denied by privacy rules".to_string();
            self.ledger
                .log_access(AccessRecord {
                    entity_id: entity.id.clone(),
                    entity_kind: entity.kind.clone(),
                    action: AuditAction::Deny,
                    provider,
                    level,
                    was_filtered: false,
                    violations: vec![denial.clone()],
                    user_id: user_id.to_string(),
                })
                .await;

            let severity = if level >= PrivacyLevel::Private {
                Severity::High
            } else {
                Severity::Medium
            };
            self.ledger
                .log_violation(ViolationRecord {
                    entity_id: entity.id.clone(),
                    rule: decision.applied_rule_ids.join(","),
                    severity,
                    description: format!(
                        "Access to {} content denied for provider {}",
                        level, provider
                    ),
                    provider: Some(provider),
                })
                .await;

            return ProcessOutcome {
                allowed: false,
                content: String::new(),
                filtered: false,
                violations: vec![denial],
            };
        }

        match decision.action {
            RuleAction::Filter => {
                let base = self.filter.apply(&entity.content, level).await;
                // Level patterns first, then the winning rule's own pass.
                let content = match decision
                    .filter_rule
                    .as_ref()
                    .and_then(|rule| rule.redact(&base.redacted))
                {
                    Some(redacted) => redacted,
                    None => base.redacted,
                };

                self.ledger
                    .log_access(AccessRecord {
                        entity_id: entity.id.clone(),
                        entity_kind: entity.kind.clone(),
                        action: AuditAction::Filter,
                        provider,
                        level,
                        was_filtered: true,
                        violations: vec![],
                        user_id: user_id.to_string(),
                    })
                    .await;

                ProcessOutcome {
                    allowed: true,
                    content,
                    filtered: true,
                    violations: vec![],
                }
            }
            RuleAction::Allow | RuleAction::Deny => {
                self.ledger
                    .log_access(AccessRecord {
                        entity_id: entity.id.clone(),
                        entity_kind: entity.kind.clone(),
                        action: AuditAction::Access,
                        provider,
                        level,
                        was_filtered: false,
                        violations: vec![],
                        user_id: user_id.to_string(),
                    })
                    .await;

                ProcessOutcome {
                    allowed: true,
                    content: entity.content.clone(),
                    filtered: false,
                    violations: vec![],
                }
            }
        }
    }

    /// Replace a provider's policy wholesale
    pub async fn set_provider_policy(&self, provider: AiProvider, policy: ProviderPolicy) {
        self.policies.write().await.set(provider, policy);
    }

    /// Read a provider's policy
    pub async fn provider_policy(&self, provider: AiProvider) -> Option<ProviderPolicy> {
        self.policies.read().await.get(provider).cloned()
    }

    /// Remove a provider's policy entirely (the provider is then denied)
    pub async fn remove_provider_policy(&self, provider: AiProvider) -> Option<ProviderPolicy> {
        self.policies.write().await.remove(provider)
    }

    /// The rule engine, for rule management
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// The content filter, for pattern management
    pub fn content_filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// The audit ledger, for trail and statistics queries
    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// Subscribe to privacy event notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PrivacyEvent> {
        self.events.subscribe()
    }

    /// Cancel the flush timer and flush the ledger one final time.
    ///
    /// Must be called before process exit; buffered entries have no
    /// crash-durability.
    pub async fn shutdown(&self) {
        self.ledger.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditStorage;

    async fn make_enforcer() -> PrivacyEnforcer {
        let storage = Arc::new(MemoryAuditStorage::new());
        PrivacyEnforcer::new(storage).await.unwrap()
    }

    fn note(id: &str, content: &str) -> ContentEntity {
        ContentEntity::new(id, "note", content)
    }

    // ---- Level resolution ----

    #[tokio::test]
    async fn test_level_resolution_order() {
        let enforcer = make_enforcer().await;

        // No cache, no declared level: fail-safe default.
        let plain = note("e1", "x");
        assert_eq!(enforcer.privacy_level(&plain).await, PrivacyLevel::Personal);

        // Declared level wins over the default.
        let declared = note("e2", "x").with_level(PrivacyLevel::Public);
        assert_eq!(enforcer.privacy_level(&declared).await, PrivacyLevel::Public);

        // Cached level wins over the declared one.
        enforcer
            .set_privacy_level("e2", PrivacyLevel::Confidential, "user-1")
            .await;
        assert_eq!(
            enforcer.privacy_level(&declared).await,
            PrivacyLevel::Confidential
        );

        // Last write wins.
        enforcer
            .set_privacy_level("e2", PrivacyLevel::Private, "user-1")
            .await;
        assert_eq!(
            enforcer.privacy_level(&declared).await,
            PrivacyLevel::Private
        );
    }

    // ---- can_access properties ----

    #[tokio::test]
    async fn test_confidential_inaccessible_to_every_provider() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "x").with_level(PrivacyLevel::Confidential);
        for provider in AiProvider::ALL {
            assert!(
                !enforcer.can_access(&entity, *provider, "user-1").await,
                "confidential accessible to {}",
                provider
            );
        }
    }

    #[tokio::test]
    async fn test_private_local_only() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "x").with_level(PrivacyLevel::Private);

        assert!(enforcer.can_access(&entity, AiProvider::Local, "user-1").await);
        for provider in AiProvider::ALL.iter().filter(|p| p.is_cloud()) {
            assert!(!enforcer.can_access(&entity, *provider, "user-1").await);
        }
    }

    #[tokio::test]
    async fn test_missing_policy_denies() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "x").with_level(PrivacyLevel::Public);

        assert!(enforcer.can_access(&entity, AiProvider::Custom, "user-1").await);
        enforcer.remove_provider_policy(AiProvider::Custom).await;
        assert!(!enforcer.can_access(&entity, AiProvider::Custom, "user-1").await);
    }

    #[tokio::test]
    async fn test_policy_replace_takes_effect() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "x").with_level(PrivacyLevel::Personal);
        assert!(enforcer.can_access(&entity, AiProvider::Local, "user-1").await);

        let public_only = crate::policy::PolicyBuilder::new()
            .allow(PrivacyLevel::Public)
            .build();
        enforcer
            .set_provider_policy(AiProvider::Local, public_only.clone())
            .await;
        assert!(!enforcer.can_access(&entity, AiProvider::Local, "user-1").await);
        assert_eq!(
            enforcer.provider_policy(AiProvider::Local).await,
            Some(public_only)
        );
    }

    // ---- process_for_ai paths ----

    #[tokio::test]
    async fn test_public_passes_through_unmodified() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "the weather is nice").with_level(PrivacyLevel::Public);

        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::OpenAi, "user-1")
            .await;
        assert!(outcome.allowed);
        assert!(!outcome.filtered);
        assert_eq!(outcome.content, "the weather is nice");
        assert!(outcome.violations.is_empty());

        enforcer.shutdown().await;
        let trail = enforcer.ledger().audit_trail("e1").await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::Access);
        assert!(!trail[0].was_filtered);
    }

    #[tokio::test]
    async fn test_personal_cloud_is_redacted() {
        // Scenario B: the redacted content carries no contact details.
        let enforcer = make_enforcer().await;
        let entity = note("e1", "Contact: test@example.com").with_level(PrivacyLevel::Personal);

        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::OpenAi, "user-1")
            .await;
        assert!(outcome.allowed);
        assert!(outcome.filtered);
        assert_eq!(outcome.content, "Contact: [REDACTED]");
        assert!(!outcome.content.contains("test@example.com"));

        enforcer.shutdown().await;
        let trail = enforcer.ledger().audit_trail("e1").await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::Filter);
        assert!(trail[0].was_filtered);
    }

    #[tokio::test]
    async fn test_personal_local_passes_through() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "Contact: test@example.com").with_level(PrivacyLevel::Personal);

        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::Local, "user-1")
            .await;
        assert!(outcome.allowed);
        assert!(!outcome.filtered);
        assert_eq!(outcome.content, "Contact: test@example.com");
        enforcer.shutdown().await;
    }

    #[tokio::test]
    async fn test_health_entity_denied_with_violation() {
        // Scenario A.
        let enforcer = make_enforcer().await;
        let entity = ContentEntity::new("h1", "health-metric", "BP 120/80");

        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::Anthropic, "user-1")
            .await;
        assert!(!outcome.allowed);
        assert!(outcome.content.is_empty());
        assert_eq!(outcome.violations, vec!["Access denied by privacy rules"]);

        let violations = enforcer.ledger().violations(Some("h1")).await.unwrap();
        assert!(!violations.is_empty());
        assert!(violations[0].severity >= Severity::Medium);
        assert!(violations[0].rule.contains("health-data-block"));
        assert_eq!(violations[0].provider, Some(AiProvider::Anthropic));

        enforcer.shutdown().await;
    }

    #[tokio::test]
    async fn test_denied_private_violation_is_high_severity() {
        let enforcer = make_enforcer().await;
        let entity = note("e1", "secret plans").with_level(PrivacyLevel::Private);

        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::Gemini, "user-1")
            .await;
        assert!(!outcome.allowed);

        let violations = enforcer.ledger().violations(Some("e1")).await.unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::High);
        assert!(violations[0].description.contains("private"));
        assert!(violations[0].description.contains("gemini"));

        enforcer.shutdown().await;
    }

    #[tokio::test]
    async fn test_cached_level_governs_processing() {
        // Scenario C, driven through the cache rather than declarations.
        let enforcer = make_enforcer().await;
        enforcer
            .set_privacy_level("e1", PrivacyLevel::Private, "user-1")
            .await;
        let entity = note("e1", "x");

        assert!(enforcer.can_access(&entity, AiProvider::Local, "user-1").await);
        assert!(!enforcer.can_access(&entity, AiProvider::OpenAi, "user-1").await);
        enforcer.shutdown().await;
    }

    #[tokio::test]
    async fn test_audit_completeness() {
        let enforcer = make_enforcer().await;
        let n = 7;
        for i in 0..n {
            let entity = note(&format!("e{}", i), "hello").with_level(PrivacyLevel::Public);
            enforcer
                .process_for_ai(&entity, AiProvider::Local, "user-1")
                .await;
        }
        enforcer.shutdown().await;

        let trail = enforcer.ledger().audit_trail("").await.unwrap();
        assert_eq!(trail.len(), n);
        let stats = enforcer.ledger().statistics().await.unwrap();
        assert_eq!(stats.total_accesses, n as u64);
        assert_eq!(stats.total_denials, 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_record_distinct_entries() {
        // Scenario D.
        let enforcer = Arc::new(make_enforcer().await);

        let a = {
            let enforcer = Arc::clone(&enforcer);
            tokio::spawn(async move {
                let entity = note("e-a", "alpha").with_level(PrivacyLevel::Public);
                enforcer.process_for_ai(&entity, AiProvider::Local, "user-1").await
            })
        };
        let b = {
            let enforcer = Arc::clone(&enforcer);
            tokio::spawn(async move {
                let entity = note("e-b", "beta").with_level(PrivacyLevel::Public);
                enforcer.process_for_ai(&entity, AiProvider::Local, "user-2").await
            })
        };
        let (a, b) = tokio::join!(a, b);
        assert!(a.unwrap().allowed);
        assert!(b.unwrap().allowed);

        enforcer.shutdown().await;
        assert_eq!(enforcer.ledger().audit_trail("e-a").await.unwrap().len(), 1);
        assert_eq!(enforcer.ledger().audit_trail("e-b").await.unwrap().len(), 1);
        assert_eq!(enforcer.ledger().audit_trail("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_observers_receive_events() {
        let enforcer = make_enforcer().await;
        let mut events = enforcer.subscribe();

        enforcer
            .set_privacy_level("e1", PrivacyLevel::Private, "user-1")
            .await;
        match events.recv().await.unwrap() {
            PrivacyEvent::LevelChanged { entity_id, level, user_id } => {
                assert_eq!(entity_id, "e1");
                assert_eq!(level, PrivacyLevel::Private);
                assert_eq!(user_id, "user-1");
            }
            other => panic!("expected LevelChanged, got {:?}", other),
        }

        let entity = note("e1", "x");
        enforcer
            .process_for_ai(&entity, AiProvider::OpenAi, "user-1")
            .await;
        assert!(matches!(
            events.recv().await.unwrap(),
            PrivacyEvent::AuditLogged(_)
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            PrivacyEvent::AccessDenied(_)
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            PrivacyEvent::ViolationRecorded(_)
        ));
        enforcer.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_filter_rule_composes_after_level_patterns() {
        let enforcer = make_enforcer().await;
        enforcer
            .rules()
            .add(crate::rules::Rule::new(
                "code-word-redact",
                "Code word redaction",
                "Replaces the project code word on the way out",
                RuleAction::Filter,
                crate::rules::FnCheck::new(|_, ctx| ctx.level == PrivacyLevel::Personal)
                    .with_redact(|text| text.replace("bluebird", "[REDACTED]")),
            ))
            .await;

        // The SSN is caught by the Personal level patterns, the code word
        // by the rule's own pass.
        let entity =
            note("e1", "bluebird status, ref 123-45-6789").with_level(PrivacyLevel::Personal);
        let outcome = enforcer
            .process_for_ai(&entity, AiProvider::Local, "user-1")
            .await;
        assert!(outcome.filtered);
        assert_eq!(outcome.content, "[REDACTED] status, ref [REDACTED]");
        enforcer.shutdown().await;
    }
}
