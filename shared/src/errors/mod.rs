//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`; lets clients branch on one field for every response
    pub success: bool,

    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, wait times)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned in `ErrorResponse::error`
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const INVALID_PHONE_FORMAT: &str = "invalid_phone_format";
    pub const PHONE_ALREADY_REGISTERED: &str = "phone_already_registered";
    pub const CODE_NOT_FOUND: &str = "code_not_found";
    pub const CODE_EXPIRED: &str = "code_expired";
    pub const ATTEMPTS_EXHAUSTED: &str = "attempts_exhausted";
    pub const INCORRECT_CODE: &str = "incorrect_code";
    pub const RESEND_THROTTLED: &str = "resend_throttled";
    pub const RATE_LIMIT_EXCEEDED: &str = "rate_limit_exceeded";
    pub const DELIVERY_FAILED: &str = "delivery_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const NOT_FOUND: &str = "not_found";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new(error_codes::RESEND_THROTTLED, "Please wait")
            .add_detail("wait_seconds", 12);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "resend_throttled");
        assert_eq!(json["details"]["wait_seconds"], 12);
    }

    #[test]
    fn test_details_omitted_when_empty() {
        let json = serde_json::to_value(ErrorResponse::new("x", "y")).unwrap();
        assert!(json.get("details").is_none());
    }
}
