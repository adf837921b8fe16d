//! Domain-specific error types and error handling.

mod types;

pub use types::VerificationError;

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The delivery provider rejected the message or timed out
    #[error("Delivery failed: {message}")]
    DeliveryFailed { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Expected outcomes are answers, not faults
    pub fn is_expected(&self) -> bool {
        matches!(self, DomainError::Verification(_))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// The inner verification outcome, if this is one
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            DomainError::Verification(e) => Some(e),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_error_conversion() {
        let error: DomainError = VerificationError::NotFound.into();
        assert!(error.is_expected());
        assert_eq!(error.as_verification(), Some(&VerificationError::NotFound));
        assert_eq!(error.to_string(), VerificationError::NotFound.to_string());
    }

    #[test]
    fn test_faults_are_not_expected() {
        assert!(!DomainError::internal("redis down").is_expected());
        let error = DomainError::DeliveryFailed {
            message: "timeout".to_string(),
        };
        assert!(!error.is_expected());
        assert_eq!(error.to_string(), "Delivery failed: timeout");
    }
}
