//! Expected outcomes of the verification workflow
//!
//! These are not failures of the system: they are answers the caller is
//! entitled to, surfaced verbatim and logged at info/warn.

use thiserror::Error;

/// Verification-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid phone format: {phone}")]
    InvalidPhoneFormat { phone: String },

    #[error("Phone number is already registered to another account")]
    PhoneAlreadyRegistered,

    #[error("No active verification code for this phone number")]
    NotFound,

    #[error("Verification code expired. Please request a new code")]
    Expired,

    #[error("Maximum attempts exceeded. Please request a new code")]
    Exhausted,

    #[error("Incorrect verification code. {remaining_attempts} attempt(s) remaining")]
    Incorrect { remaining_attempts: u32 },

    #[error("Please wait {wait_seconds} seconds before requesting a new code")]
    Throttled { wait_seconds: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = VerificationError::Incorrect {
            remaining_attempts: 2,
        };
        assert_eq!(
            error.to_string(),
            "Incorrect verification code. 2 attempt(s) remaining"
        );

        let error = VerificationError::Throttled { wait_seconds: 17 };
        assert!(error.to_string().contains("17 seconds"));
    }
}
