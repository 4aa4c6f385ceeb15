//! Privacy taxonomy: classification levels, provider identities, and the
//! content/context shapes the enforcement engine operates on.

use serde::{Deserialize, Serialize};

/// Ordered sensitivity classification for knowledge content.
///
/// The ordering is total and load-bearing: `Public < Personal < Private <
/// Confidential`. Comparisons drive both rule evaluation and violation
/// severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    /// Freely shareable content
    Public,
    /// Default classification for unlabeled content
    Personal,
    /// Content that must never leave the local machine
    Private,
    /// Content no model may see, local or otherwise
    Confidential,
}

impl PrivacyLevel {
    /// All levels in ascending sensitivity order.
    ///
    /// Used to pre-initialize per-level statistics buckets so every level
    /// is present even with zero traffic.
    pub const ALL: &'static [Self] = &[
        Self::Public,
        Self::Personal,
        Self::Private,
        Self::Confidential,
    ];
}

impl std::fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Personal => write!(f, "personal"),
            Self::Private => write!(f, "private"),
            Self::Confidential => write!(f, "confidential"),
        }
    }
}

impl std::str::FromStr for PrivacyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "personal" => Ok(Self::Personal),
            "private" => Ok(Self::Private),
            "confidential" => Ok(Self::Confidential),
            other => Err(format!("unknown privacy level: {}", other)),
        }
    }
}

/// Identity of a consumer of content for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    /// No provider — content is not being sent anywhere
    None,
    /// Locally hosted model, no network egress
    Local,
    /// OpenAI cloud inference
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic cloud inference
    Anthropic,
    /// Google Gemini cloud inference
    Gemini,
    /// User-configured custom endpoint
    Custom,
}

impl AiProvider {
    /// All provider identities.
    pub const ALL: &'static [Self] = &[
        Self::None,
        Self::Local,
        Self::OpenAi,
        Self::Anthropic,
        Self::Gemini,
        Self::Custom,
    ];

    /// Whether content handed to this provider leaves the local machine.
    ///
    /// Custom endpoints are assumed remote until proven otherwise.
    pub fn is_cloud(&self) -> bool {
        matches!(self, Self::OpenAi | Self::Anthropic | Self::Gemini | Self::Custom)
    }

    /// Whether this provider keeps content on the local machine.
    pub fn is_local(&self) -> bool {
        !self.is_cloud()
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Local => write!(f, "local"),
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Gemini => write!(f, "gemini"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "local" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown AI provider: {}", other)),
        }
    }
}

/// A piece of knowledge content presented for an access decision.
///
/// Read-only from the engine's perspective; the owning store remains the
/// source of truth. `declared_level` is advisory — a cached level set via
/// the service always wins over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    /// Stable entity identifier
    pub id: String,
    /// Entity kind, e.g. "note", "health-metric", "financial-record"
    pub kind: String,
    /// Text content under consideration
    pub content: String,
    /// Privacy level declared on the entity itself, if any
    #[serde(default)]
    pub declared_level: Option<PrivacyLevel>,
}

impl ContentEntity {
    /// Convenience constructor for an entity without a declared level.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            content: content.into(),
            declared_level: None,
        }
    }

    /// Set the declared privacy level.
    pub fn with_level(mut self, level: PrivacyLevel) -> Self {
        self.declared_level = Some(level);
        self
    }
}

/// Context for a single access evaluation.
///
/// Carries the resolved privacy level so rule predicates see the
/// cache-overridden classification, not whatever the entity declares.
#[derive(Debug, Clone)]
pub struct AccessContext {
    /// Provider requesting the content
    pub provider: AiProvider,
    /// User on whose behalf the request is made
    pub user_id: String,
    /// Resolved privacy level for the entity
    pub level: PrivacyLevel,
}
