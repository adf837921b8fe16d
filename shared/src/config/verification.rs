//! Verification code policy

use serde::{Deserialize, Serialize};

/// Lifetime and attempt budget of issued codes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Seconds a code stays valid after issuance
    pub code_ttl_seconds: u64,

    /// Validation attempts allowed per code
    pub max_attempts: u32,

    /// Echo issued codes in API responses. Only honoured by builds with the
    /// `otp-backdoor` feature and never in production.
    pub expose_code_in_response: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 5 * 60,
            max_attempts: 3,
            expose_code_in_response: false,
        }
    }
}
