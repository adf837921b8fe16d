//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable per-address admission limiting
    pub enabled: bool,

    /// Max issuance requests (send and resend) per client address per window
    pub issue_per_address: u32,

    /// Sliding window length in seconds
    pub issue_window_seconds: u64,

    /// Minimum seconds between two issuances for the same phone number
    pub resend_cooldown_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            issue_per_address: 3,
            issue_window_seconds: 15 * 60,
            resend_cooldown_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.issue_per_address, 3);
        assert_eq!(config.issue_window_seconds, 900);
        assert_eq!(config.resend_cooldown_seconds, 30);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: RateLimitConfig =
            serde_json::from_str(r#"{"issue_per_address": 5}"#).unwrap();
        assert_eq!(config.issue_per_address, 5);
        assert_eq!(config.issue_window_seconds, 900);
    }
}
