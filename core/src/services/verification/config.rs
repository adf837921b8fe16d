//! Configuration for the verification service

use chrono::Duration;

use crate::domain::entities::{DEFAULT_CODE_TTL_SECONDS, DEFAULT_RESEND_COOLDOWN_SECONDS, MAX_ATTEMPTS};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Seconds before a verification code expires
    pub code_ttl_seconds: i64,
    /// Maximum number of verification attempts allowed
    pub max_attempts: u32,
    /// Minimum seconds between two issuances for the same number
    pub resend_cooldown_seconds: i64,
    /// Whether issued codes may be echoed back to the caller (non-production only)
    pub expose_code: bool,
}

impl VerificationServiceConfig {
    pub fn code_ttl(&self) -> Duration {
        Duration::seconds(self.code_ttl_seconds)
    }

    pub fn resend_cooldown(&self) -> Duration {
        Duration::seconds(self.resend_cooldown_seconds)
    }

    /// Validity in whole minutes as shown in the delivered message
    pub fn validity_minutes(&self) -> i64 {
        (self.code_ttl_seconds + 59) / 60
    }
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            max_attempts: MAX_ATTEMPTS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            expose_code: false,
        }
    }
}
