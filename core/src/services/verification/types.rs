//! Types for verification service results

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{OwnerId, PhoneNumber, Transport};

/// Result of issuing or re-issuing a code
#[derive(Debug, Clone)]
pub struct IssueCodeResult {
    pub phone_number: PhoneNumber,
    /// Provider message id
    pub message_id: String,
    pub transport: Transport,
    pub expires_at: DateTime<Utc>,
    /// Earliest instant a resend will be accepted
    pub next_resend_at: DateTime<Utc>,
    /// The issued code; only `Some` when the service is configured to expose it
    pub code: Option<String>,
}

/// Result of a successful validation
#[derive(Debug, Clone)]
pub struct ValidateCodeResult {
    pub phone_number: PhoneNumber,
    /// Identity the number is now verified for, if any
    pub owner_id: Option<OwnerId>,
    pub verified_at: DateTime<Utc>,
}
