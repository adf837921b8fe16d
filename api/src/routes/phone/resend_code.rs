use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::ResendCodeRequest;
use crate::handlers::{handle_domain_error, validation_error};
use crate::middleware::CallerIdentity;

use super::{issued_response, parse_channel};

/// Handler for POST /api/v1/phone/resend-code
///
/// Same contract as send-code, but refused with 429 `resend_throttled`
/// (plus `Retry-After`) until the cooldown since the last issuance has passed.
pub async fn resend_code(
    state: web::Data<AppState>,
    caller: CallerIdentity,
    request: web::Json<ResendCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        log::warn!("Validation failed for resend_code request: {:?}", errors);
        return validation_error(&errors);
    }

    let transport = match parse_channel(request.channel.as_deref()) {
        Ok(transport) => transport,
        Err(response) => return response,
    };

    match state
        .verification
        .resend_code(&request.phone_number, transport, caller.owner())
        .await
    {
        Ok(result) => issued_response(
            "Verification code resent successfully",
            result,
            state.verification.config(),
        ),
        Err(error) => handle_domain_error(error),
    }
}
