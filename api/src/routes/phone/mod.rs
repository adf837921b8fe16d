//! Phone verification route handlers
//!
//! - `POST /api/v1/phone/send-code`
//! - `POST /api/v1/phone/verify-code`
//! - `POST /api/v1/phone/resend-code`

pub mod resend_code;
pub mod send_code;
pub mod verify_code;

pub use resend_code::resend_code;
pub use send_code::send_code;
pub use verify_code::verify_code;

use actix_web::HttpResponse;
use pv_core::domain::Transport;
use pv_core::services::{IssueCodeResult, VerificationServiceConfig};
use pv_shared::errors::{error_codes, ErrorResponse};
use pv_shared::types::ApiResponse;

use crate::dto::SendCodeResponse;

/// Resolve the optional `channel` field, defaulting to SMS
pub(crate) fn parse_channel(channel: Option<&str>) -> Result<Transport, HttpResponse> {
    match channel.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(Transport::default()),
        Some(value) => value.parse::<Transport>().map_err(|message| {
            HttpResponse::BadRequest().json(
                ErrorResponse::new(error_codes::VALIDATION_ERROR, message)
                    .add_detail("channel", value),
            )
        }),
    }
}

/// 200 body shared by send and resend
pub(crate) fn issued_response(
    message: &str,
    result: IssueCodeResult,
    config: &VerificationServiceConfig,
) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(SendCodeResponse {
        message: message.to_string(),
        expires_in: config.code_ttl_seconds,
        resend_after: config.resend_cooldown_seconds,
        code: exposed_code(result),
    }))
}

#[cfg(feature = "otp-backdoor")]
fn exposed_code(result: IssueCodeResult) -> Option<String> {
    if result.code.is_some() {
        log::warn!("Echoing verification code in response (otp-backdoor build)");
    }
    result.code
}

#[cfg(not(feature = "otp-backdoor"))]
fn exposed_code(_result: IssueCodeResult) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel(None).unwrap(), Transport::Sms);
        assert_eq!(parse_channel(Some("  ")).unwrap(), Transport::Sms);
        assert_eq!(parse_channel(Some("whatsapp")).unwrap(), Transport::WhatsApp);
        assert!(parse_channel(Some("carrier-pigeon")).is_err());
    }
}
