use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// E.164 number; spaces, dashes and parentheses are tolerated
    /// Examples: "+15551234567", "+1 (555) 123-4567"
    #[validate(length(min = 1, max = 32, message = "phone_number must be 1 to 32 characters"))]
    pub phone_number: String,

    /// "sms" (default) or "whatsapp"
    #[serde(default)]
    pub channel: Option<String>,
}

/// Resend takes the same body as send
pub type ResendCodeRequest = SendCodeRequest;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 32, message = "phone_number must be 1 to 32 characters"))]
    pub phone_number: String,

    /// The code as delivered; surrounding whitespace is ignored
    #[validate(length(min = 1, max = 16, message = "code must be 1 to 16 characters"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    pub message: String,
    /// Seconds until the code expires
    pub expires_in: i64,
    /// Seconds until a resend will be accepted
    pub resend_after: i64,
    /// Only present in test builds with code exposure enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
    pub phone_number: String,
}
