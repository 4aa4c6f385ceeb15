//! Ordered privacy rules and their evaluation engine
//!
//! Rules are walked in registration order. A matching `Deny` rule decides
//! the outcome and stops the walk; a matching `Filter` rule is adopted
//! tentatively, with a later `Filter` match replacing (never composing
//! with) the earlier one. Exactly one action wins per evaluation.

use crate::error::{Error, Result};
use crate::filter::{EMAIL_PATTERN, PHONE_PATTERN, REDACTION_TOKEN};
use crate::taxonomy::{AccessContext, ContentEntity, PrivacyLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Action a rule takes when its condition holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Content may pass unmodified
    Allow,
    /// Access is refused outright
    Deny,
    /// Content passes after redaction
    Filter,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::Filter => write!(f, "filter"),
        }
    }
}

/// Pluggable behavior pair backing a rule.
///
/// The narrow capability interface a rule invokes: one predicate deciding
/// whether the rule applies, and an optional redaction pass used when the
/// rule's action is [`RuleAction::Filter`]. Predicates that panic propagate
/// to the caller — a panicking predicate is a bug, not a policy signal.
pub trait RuleCheck: Send + Sync {
    /// Whether this rule applies to the entity under the given context
    fn matches(&self, entity: &ContentEntity, ctx: &AccessContext) -> bool;

    /// Rule-specific redaction, run after level-pattern filtering.
    ///
    /// `None` means the rule supplies no redaction of its own.
    fn redact(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Closure-backed [`RuleCheck`] adapter
pub struct FnCheck {
    matches: Box<dyn Fn(&ContentEntity, &AccessContext) -> bool + Send + Sync>,
    redact: Option<Box<dyn Fn(&str) -> String + Send + Sync>>,
}

impl FnCheck {
    /// Wrap a predicate closure
    pub fn new(
        matches: impl Fn(&ContentEntity, &AccessContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            matches: Box::new(matches),
            redact: None,
        }
    }

    /// Attach a redaction closure
    pub fn with_redact(mut self, redact: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.redact = Some(Box::new(redact));
        self
    }
}

impl RuleCheck for FnCheck {
    fn matches(&self, entity: &ContentEntity, ctx: &AccessContext) -> bool {
        (self.matches)(entity, ctx)
    }

    fn redact(&self, text: &str) -> Option<String> {
        self.redact.as_ref().map(|redact| redact(text))
    }
}

/// A named condition→action pair
#[derive(Clone)]
pub struct Rule {
    /// Unique rule identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// What the rule is for
    pub description: String,
    /// Action taken when the condition holds
    pub action: RuleAction,
    check: Arc<dyn RuleCheck>,
}

impl Rule {
    /// Create a rule from its parts
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        action: RuleAction,
        check: impl RuleCheck + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            action,
            check: Arc::new(check),
        }
    }

    /// Evaluate the rule's condition
    pub fn matches(&self, entity: &ContentEntity, ctx: &AccessContext) -> bool {
        self.check.matches(entity, ctx)
    }

    /// Apply the rule's redaction pass, if it has one
    pub fn redact(&self, text: &str) -> Option<String> {
        self.check.redact(text)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}

/// Outcome of walking the rule list once
#[derive(Debug, Clone)]
pub struct RuleDecision {
    /// Whether access is permitted at all
    pub allowed: bool,
    /// The winning action
    pub action: RuleAction,
    /// Ids of rules whose condition held, in walk order.
    ///
    /// A Deny stops the walk, so this is a prefix of the matching set,
    /// not the full set.
    pub applied_rule_ids: Vec<String>,
    /// The Filter rule whose redaction pass won, if any
    pub filter_rule: Option<Rule>,
}

/// Ordered rule store and evaluator
pub struct RuleEngine {
    rules: Arc<RwLock<Vec<Rule>>>,
}

impl RuleEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create an engine seeded with the default privacy rules
    pub fn with_default_rules() -> Result<Self> {
        Ok(Self {
            rules: Arc::new(RwLock::new(default_rules()?)),
        })
    }

    /// Walk the rules in registration order and decide the outcome
    pub async fn evaluate(&self, entity: &ContentEntity, ctx: &AccessContext) -> RuleDecision {
        let rules = self.rules.read().await;
        let mut action = RuleAction::Allow;
        let mut applied = Vec::new();
        let mut filter_rule = None;

        for rule in rules.iter() {
            if !rule.matches(entity, ctx) {
                continue;
            }
            applied.push(rule.id.clone());
            match rule.action {
                RuleAction::Deny => {
                    action = RuleAction::Deny;
                    filter_rule = None;
                    break;
                }
                RuleAction::Filter => {
                    action = RuleAction::Filter;
                    filter_rule = Some(rule.clone());
                }
                RuleAction::Allow => {}
            }
        }

        RuleDecision {
            allowed: action != RuleAction::Deny,
            action,
            applied_rule_ids: applied,
            filter_rule,
        }
    }

    /// Add a rule. A rule with an existing id replaces it in place,
    /// preserving its position in the evaluation order; a new id appends.
    pub async fn add(&self, rule: Rule) {
        let mut rules = self.rules.write().await;
        if let Some(existing) = rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        } else {
            rules.push(rule);
        }
    }

    /// Remove a rule by id
    pub async fn remove(&self, id: &str) -> bool {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|rule| rule.id != id);
        rules.len() != before
    }

    /// Get a rule by id
    pub async fn get(&self, id: &str) -> Option<Rule> {
        self.rules.read().await.iter().find(|rule| rule.id == id).cloned()
    }

    /// All rules in evaluation order
    pub async fn list(&self) -> Vec<Rule> {
        self.rules.read().await.clone()
    }

    /// Remove every rule
    pub async fn clear(&self) {
        self.rules.write().await.clear();
    }

    /// Number of registered rules
    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    /// Whether the engine has no rules
    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The default ordered rule set
pub fn default_rules() -> Result<Vec<Rule>> {
    let email = Regex::new(EMAIL_PATTERN)
        .map_err(|e| Error::Rule(format!("Invalid email pattern: {}", e)))?;
    let phone = Regex::new(PHONE_PATTERN)
        .map_err(|e| Error::Rule(format!("Invalid phone pattern: {}", e)))?;

    Ok(vec![
        Rule::new(
            "confidential-block",
            "Confidential lockout",
            "Confidential content never reaches a model, local or otherwise",
            RuleAction::Deny,
            FnCheck::new(|_, ctx| ctx.level == PrivacyLevel::Confidential),
        ),
        Rule::new(
            "private-cloud-block",
            "Private stays local",
            "Private content may not be sent to cloud providers",
            RuleAction::Deny,
            FnCheck::new(|_, ctx| ctx.level == PrivacyLevel::Private && ctx.provider.is_cloud()),
        ),
        Rule::new(
            "personal-cloud-redact",
            "Personal data redaction",
            "Personal content going to a cloud provider has contact details redacted",
            RuleAction::Filter,
            FnCheck::new(|_, ctx| ctx.level == PrivacyLevel::Personal && ctx.provider.is_cloud())
                .with_redact(move |text| {
                    let pass = email.replace_all(text, REDACTION_TOKEN).into_owned();
                    phone.replace_all(&pass, REDACTION_TOKEN).into_owned()
                }),
        ),
        Rule::new(
            "health-data-block",
            "Health data lockout",
            "Health and medical entities are never processed by any provider",
            RuleAction::Deny,
            FnCheck::new(|entity, _| {
                let kind = entity.kind.to_lowercase();
                kind.contains("health") || kind.contains("medical")
            }),
        ),
        Rule::new(
            "financial-cloud-block",
            "Financial data stays local",
            "Financial and budget entities may not be sent to cloud providers",
            RuleAction::Deny,
            FnCheck::new(|entity, ctx| {
                let kind = entity.kind.to_lowercase();
                (kind.contains("financial") || kind.contains("budget")) && ctx.provider.is_cloud()
            }),
        ),
    ])
}
