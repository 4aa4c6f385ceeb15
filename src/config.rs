//! MindGate configuration

use crate::taxonomy::PrivacyLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Privacy enforcement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcerConfig {
    /// Interval between periodic audit flushes, in milliseconds
    pub flush_interval_ms: u64,

    /// Level assigned to content with no cached or declared classification.
    ///
    /// Fail-safe: unknown content is never treated as Public.
    pub default_level: PrivacyLevel,

    /// Capacity of the privacy event broadcast channel
    pub event_capacity: usize,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 5000,
            default_level: PrivacyLevel::Personal,
            event_capacity: 256,
        }
    }
}

impl EnforcerConfig {
    /// Flush interval as a `Duration`
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnforcerConfig::default();
        assert_eq!(config.flush_interval(), Duration::from_millis(5000));
        assert_eq!(config.default_level, PrivacyLevel::Personal);
        assert!(config.event_capacity > 0);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = EnforcerConfig {
            flush_interval_ms: 100,
            default_level: PrivacyLevel::Private,
            event_capacity: 8,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EnforcerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.flush_interval_ms, 100);
        assert_eq!(parsed.default_level, PrivacyLevel::Private);
    }
}
