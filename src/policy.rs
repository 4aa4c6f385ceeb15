//! Provider policy registry for data egress decisions

use crate::taxonomy::{AiProvider, PrivacyLevel};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Static configuration of what a single provider may ever receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPolicy {
    /// Privacy levels this provider is permitted to receive
    pub allowed_levels: HashSet<PrivacyLevel>,
    /// Whether the provider retains submitted data
    pub data_retention: bool,
    /// Whether the provider shares data with third parties
    pub third_party_sharing: bool,
    /// Whether transport encryption is required
    pub encryption_required: bool,
}

impl ProviderPolicy {
    /// Whether the given level may be sent to this provider
    pub fn allows(&self, level: PrivacyLevel) -> bool {
        self.allowed_levels.contains(&level)
    }
}

/// Registry mapping every provider identity to exactly one policy.
///
/// Seeded with defaults at construction; policies are replaced wholesale,
/// never patched field by field. The registry is owned by the enforcement
/// service — there is no ambient global table.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<AiProvider, ProviderPolicy>,
}

impl PolicyRegistry {
    /// Create a registry seeded with the default policy table.
    ///
    /// Every `AiProvider` variant resolves to a policy. Cloud providers are
    /// capped at Personal; only the no-egress identities may see Private.
    pub fn with_defaults() -> Self {
        let mut policies = HashMap::new();

        // Nothing leaves the process; rules still gate every access.
        policies.insert(
            AiProvider::None,
            ProviderPolicy {
                allowed_levels: PrivacyLevel::ALL.iter().copied().collect(),
                data_retention: false,
                third_party_sharing: false,
                encryption_required: false,
            },
        );
        policies.insert(
            AiProvider::Local,
            ProviderPolicy {
                allowed_levels: [
                    PrivacyLevel::Public,
                    PrivacyLevel::Personal,
                    PrivacyLevel::Private,
                ]
                .into_iter()
                .collect(),
                data_retention: false,
                third_party_sharing: false,
                encryption_required: false,
            },
        );
        policies.insert(
            AiProvider::OpenAi,
            ProviderPolicy {
                allowed_levels: [PrivacyLevel::Public, PrivacyLevel::Personal]
                    .into_iter()
                    .collect(),
                data_retention: true,
                third_party_sharing: false,
                encryption_required: true,
            },
        );
        policies.insert(
            AiProvider::Anthropic,
            ProviderPolicy {
                allowed_levels: [PrivacyLevel::Public, PrivacyLevel::Personal]
                    .into_iter()
                    .collect(),
                data_retention: false,
                third_party_sharing: false,
                encryption_required: true,
            },
        );
        policies.insert(
            AiProvider::Gemini,
            ProviderPolicy {
                allowed_levels: [PrivacyLevel::Public, PrivacyLevel::Personal]
                    .into_iter()
                    .collect(),
                data_retention: true,
                third_party_sharing: true,
                encryption_required: true,
            },
        );
        // Unknown endpoints get the most conservative default.
        policies.insert(
            AiProvider::Custom,
            ProviderPolicy {
                allowed_levels: [PrivacyLevel::Public].into_iter().collect(),
                data_retention: false,
                third_party_sharing: false,
                encryption_required: true,
            },
        );

        Self { policies }
    }

    /// Look up the policy for a provider
    pub fn get(&self, provider: AiProvider) -> Option<&ProviderPolicy> {
        self.policies.get(&provider)
    }

    /// Replace the policy for a provider wholesale
    pub fn set(&mut self, provider: AiProvider, policy: ProviderPolicy) {
        self.policies.insert(provider, policy);
    }

    /// Remove the policy for a provider.
    ///
    /// A provider without a policy is denied all access.
    pub fn remove(&mut self, provider: AiProvider) -> Option<ProviderPolicy> {
        self.policies.remove(&provider)
    }

    /// Number of registered policies
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Builder for creating custom provider policies
pub struct PolicyBuilder {
    policy: ProviderPolicy,
}

impl PolicyBuilder {
    /// Create a builder with no allowed levels and all flags off
    pub fn new() -> Self {
        Self {
            policy: ProviderPolicy {
                allowed_levels: HashSet::new(),
                data_retention: false,
                third_party_sharing: false,
                encryption_required: false,
            },
        }
    }

    /// Permit a privacy level
    pub fn allow(mut self, level: PrivacyLevel) -> Self {
        self.policy.allowed_levels.insert(level);
        self
    }

    /// Set the data retention flag
    pub fn data_retention(mut self, retention: bool) -> Self {
        self.policy.data_retention = retention;
        self
    }

    /// Set the third-party sharing flag
    pub fn third_party_sharing(mut self, sharing: bool) -> Self {
        self.policy.third_party_sharing = sharing;
        self
    }

    /// Set the encryption requirement flag
    pub fn encryption_required(mut self, required: bool) -> Self {
        self.policy.encryption_required = required;
        self
    }

    /// Build the policy
    pub fn build(self) -> ProviderPolicy {
        self.policy
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_provider() {
        let registry = PolicyRegistry::with_defaults();
        for provider in AiProvider::ALL {
            assert!(
                registry.get(*provider).is_some(),
                "missing default policy for {}",
                provider
            );
        }
        assert_eq!(registry.len(), AiProvider::ALL.len());
    }

    #[test]
    fn test_cloud_providers_capped_at_personal() {
        let registry = PolicyRegistry::with_defaults();
        for provider in AiProvider::ALL.iter().filter(|p| p.is_cloud()) {
            let policy = registry.get(*provider).unwrap();
            assert!(!policy.allows(PrivacyLevel::Private));
            assert!(!policy.allows(PrivacyLevel::Confidential));
        }
    }

    #[test]
    fn test_local_allows_private() {
        let registry = PolicyRegistry::with_defaults();
        let policy = registry.get(AiProvider::Local).unwrap();
        assert!(policy.allows(PrivacyLevel::Private));
        assert!(!policy.allows(PrivacyLevel::Confidential));
    }

    #[test]
    fn test_wholesale_replace() {
        let mut registry = PolicyRegistry::with_defaults();
        let strict = PolicyBuilder::new()
            .allow(PrivacyLevel::Public)
            .encryption_required(true)
            .build();
        registry.set(AiProvider::OpenAi, strict.clone());
        assert_eq!(registry.get(AiProvider::OpenAi), Some(&strict));
        assert!(!registry.get(AiProvider::OpenAi).unwrap().allows(PrivacyLevel::Personal));
    }

    #[test]
    fn test_removed_provider_has_no_policy() {
        let mut registry = PolicyRegistry::with_defaults();
        assert!(registry.remove(AiProvider::Custom).is_some());
        assert!(registry.get(AiProvider::Custom).is_none());
    }

    #[test]
    fn test_builder() {
        let policy = PolicyBuilder::new()
            .allow(PrivacyLevel::Public)
            .allow(PrivacyLevel::Personal)
            .data_retention(true)
            .third_party_sharing(false)
            .encryption_required(true)
            .build();
        assert!(policy.allows(PrivacyLevel::Personal));
        assert!(!policy.allows(PrivacyLevel::Private));
        assert!(policy.data_retention);
        assert!(policy.encryption_required);
    }
}
