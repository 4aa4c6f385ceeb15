//! Pattern-based content redaction keyed by privacy level
//!
//! Each privacy level owns an independent list of compiled patterns — a
//! level's list is not inherited from lower levels. Redaction walks the
//! level's patterns in registration order, records every raw match, then
//! replaces the matches with a fixed token. Later patterns operate on the
//! already-redacted text, so overlapping matches never double-fire, and
//! because the token itself matches no default pattern, re-filtering
//! redacted text is a no-op.

use crate::error::{Error, Result};
use crate::taxonomy::PrivacyLevel;
use regex::Regex;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Fixed placeholder substituted for every redacted span
pub const REDACTION_TOKEN: &str = "[REDACTED]";

/// National-id-shaped token (NNN-NN-NNNN)
pub(crate) const NATIONAL_ID_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";

/// Unbroken digit run long enough to be an account or card number
pub(crate) const LONG_DIGITS_PATTERN: &str = r"\b\d{9,}\b";

/// Dotted-quad IPv4 address
pub(crate) const IPV4_PATTERN: &str =
    r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b";

/// Email address
pub(crate) const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Phone-number-shaped token with optional country code and separators
pub(crate) const PHONE_PATTERN: &str =
    r"(?:\+?\d{1,2}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b";

/// Government-ID-shaped token (passport style: letters then digits)
pub(crate) const GOVERNMENT_ID_PATTERN: &str = r"\b[A-Z]{1,2}\d{6,9}\b";

/// Catch-all for Confidential content. `.+` rather than `.*` so empty
/// input never matches.
pub(crate) const MATCH_ALL_PATTERN: &str = r"(?s).+";

/// Outcome of one redaction pass
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Whether anything was redacted
    pub filtered: bool,
    /// The input text, untouched
    pub original: String,
    /// The text with every match replaced by [`REDACTION_TOKEN`]
    pub redacted: String,
    /// Raw substrings that were removed, in pattern order
    pub removed: Vec<String>,
    /// Level whose pattern list was applied
    pub level: PrivacyLevel,
}

/// Regex redaction engine with one pattern list per privacy level
pub struct ContentFilter {
    patterns: RwLock<HashMap<PrivacyLevel, Vec<Regex>>>,
}

impl ContentFilter {
    /// Create a filter with no patterns registered
    pub fn new() -> Self {
        Self {
            patterns: RwLock::new(HashMap::new()),
        }
    }

    /// Create a filter with the default pattern lists.
    ///
    /// Public carries no patterns. Personal redacts national-id-shaped,
    /// long-digit and IPv4 tokens. Private is a superset adding email,
    /// phone-shaped and government-ID-shaped tokens. Confidential redacts
    /// the entire input.
    pub fn with_defaults() -> Result<Self> {
        let defaults: &[(PrivacyLevel, &[&str])] = &[
            (PrivacyLevel::Public, &[]),
            (
                PrivacyLevel::Personal,
                &[NATIONAL_ID_PATTERN, LONG_DIGITS_PATTERN, IPV4_PATTERN],
            ),
            (
                PrivacyLevel::Private,
                &[
                    EMAIL_PATTERN,
                    PHONE_PATTERN,
                    GOVERNMENT_ID_PATTERN,
                    NATIONAL_ID_PATTERN,
                    LONG_DIGITS_PATTERN,
                    IPV4_PATTERN,
                ],
            ),
            (PrivacyLevel::Confidential, &[MATCH_ALL_PATTERN]),
        ];

        let mut patterns = HashMap::new();
        for (level, list) in defaults {
            let compiled = list
                .iter()
                .map(|pattern| compile(*level, pattern))
                .collect::<Result<Vec<_>>>()?;
            patterns.insert(*level, compiled);
        }

        Ok(Self {
            patterns: RwLock::new(patterns),
        })
    }

    /// Redact `text` using the pattern list for `level`.
    ///
    /// Empty input deterministically yields `filtered = false`.
    pub async fn apply(&self, text: &str, level: PrivacyLevel) -> FilterOutcome {
        let patterns = self.patterns.read().await;
        let mut redacted = text.to_string();
        let mut removed = Vec::new();

        if let Some(list) = patterns.get(&level) {
            for pattern in list {
                let mut matched = false;
                for mat in pattern.find_iter(&redacted) {
                    removed.push(mat.as_str().to_string());
                    matched = true;
                }
                if matched {
                    redacted = pattern.replace_all(&redacted, REDACTION_TOKEN).into_owned();
                }
            }
        }

        FilterOutcome {
            filtered: !removed.is_empty(),
            original: text.to_string(),
            redacted,
            removed,
            level,
        }
    }

    /// Append a custom pattern to a level's list
    pub async fn add_pattern(&self, level: PrivacyLevel, pattern: &str) -> Result<()> {
        let compiled = compile(level, pattern)?;
        self.patterns
            .write()
            .await
            .entry(level)
            .or_default()
            .push(compiled);
        Ok(())
    }

    /// Remove every pattern for a level. Other levels are unaffected.
    pub async fn clear_level(&self, level: PrivacyLevel) {
        if let Some(list) = self.patterns.write().await.get_mut(&level) {
            list.clear();
        }
    }

    /// Number of patterns registered for a level
    pub async fn pattern_count(&self, level: PrivacyLevel) -> usize {
        self.patterns
            .read()
            .await
            .get(&level)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(level: PrivacyLevel, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Filter(format!("Invalid pattern for {} level: {}", level, e)))
}
