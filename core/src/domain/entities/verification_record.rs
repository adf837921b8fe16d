//! Verification record entity: the single live OTP for a phone number.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{OwnerId, PhoneNumber, Transport};

/// Maximum number of verification attempts allowed
pub const MAX_ATTEMPTS: u32 = 3;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a code (5 minutes)
pub const DEFAULT_CODE_TTL_SECONDS: i64 = 300;

/// Default minimum gap between two issuances for the same number
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 30;

/// Render the message body delivered to the user
pub fn verification_message(code: &str, validity_minutes: i64) -> String {
    format!(
        "Your verification code is: {}. Valid for {} minutes.",
        code, validity_minutes
    )
}

/// One live verification code for a phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Canonical E.164 number, the identity key of the record
    pub phone_number: PhoneNumber,

    /// The 6-digit code
    pub code: String,

    /// Identity that requested the code, absent for anonymous issuance
    pub owner_id: Option<OwnerId>,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Number of validation attempts registered so far
    pub attempts: u32,

    /// Set only at the instant of successful validation
    pub verified: bool,

    /// Transport the code was last delivered over
    pub transport: Transport,
}

impl VerificationRecord {
    /// Issue a fresh record with a newly generated code
    pub fn issue(
        phone_number: PhoneNumber,
        owner_id: Option<OwnerId>,
        transport: Transport,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            phone_number,
            code: Self::generate_code(),
            owner_id,
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
            verified: false,
            transport,
        }
    }

    /// Uniformly random 6-digit code drawn from the operating system CSPRNG
    pub fn generate_code() -> String {
        let code: u32 = OsRng.gen_range(0..1_000_000);
        format!("{:06}", code)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    pub fn remaining_attempts(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.trim().as_bytes())
    }

    /// Whether `other` was read from the same issuance as `self`
    ///
    /// Attempt counts and the verified flag may differ.
    pub fn same_issuance(&self, other: &VerificationRecord) -> bool {
        self.phone_number == other.phone_number
            && self.created_at == other.created_at
            && self.code == other.code
    }

    /// Seconds left until expiry, zero once expired
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn phone() -> PhoneNumber {
        PhoneNumber::parse("+61412345678").unwrap()
    }

    #[test]
    fn test_issue_record() {
        let now = Utc::now();
        let record = VerificationRecord::issue(
            phone(),
            None,
            Transport::Sms,
            now,
            Duration::seconds(DEFAULT_CODE_TTL_SECONDS),
        );

        assert_eq!(record.code.len(), CODE_LENGTH);
        assert_eq!(record.attempts, 0);
        assert!(!record.verified);
        assert_eq!(record.expires_at - record.created_at, Duration::minutes(5));
        assert!(!record.is_expired_at(now));
        assert!(record.is_expired_at(record.expires_at));
    }

    #[test]
    fn test_generate_code_format() {
        for _ in 0..100 {
            let code = VerificationRecord::generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_code_uniqueness() {
        let codes: HashSet<String> = (0..100)
            .map(|_| VerificationRecord::generate_code())
            .collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_attempt_accounting() {
        let mut record = VerificationRecord::issue(
            phone(),
            None,
            Transport::Sms,
            Utc::now(),
            Duration::minutes(5),
        );
        assert_eq!(record.remaining_attempts(MAX_ATTEMPTS), 3);
        record.attempts = 3;
        assert!(record.is_exhausted(MAX_ATTEMPTS));
        assert_eq!(record.remaining_attempts(MAX_ATTEMPTS), 0);
    }

    #[test]
    fn test_matches() {
        let mut record = VerificationRecord::issue(
            phone(),
            None,
            Transport::WhatsApp,
            Utc::now(),
            Duration::minutes(5),
        );
        record.code = "042317".to_string();
        assert!(record.matches("042317"));
        assert!(record.matches(" 042317 "));
        assert!(!record.matches("42317"));
        assert!(!record.matches("042318"));
    }

    #[test]
    fn test_same_issuance_ignores_attempts() {
        let now = Utc::now();
        let record = VerificationRecord::issue(phone(), None, Transport::Sms, now, Duration::minutes(5));

        let mut counted = record.clone();
        counted.attempts = 2;
        assert!(record.same_issuance(&counted));

        let mut reissued = record.clone();
        reissued.created_at = now + Duration::seconds(30);
        assert!(!record.same_issuance(&reissued));

        let mut other_code = record.clone();
        other_code.code = if record.code == "000000" { "111111" } else { "000000" }.to_string();
        assert!(!record.same_issuance(&other_code));
    }

    #[test]
    fn test_verification_message() {
        assert_eq!(
            verification_message("123456", 5),
            "Your verification code is: 123456. Valid for 5 minutes."
        );
    }
}
