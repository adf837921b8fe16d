use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::SendCodeRequest;
use crate::handlers::{handle_domain_error, validation_error};
use crate::middleware::CallerIdentity;

use super::{issued_response, parse_channel};

/// Handler for POST /api/v1/phone/send-code
///
/// Issues a fresh code, superseding any code still live for the number.
///
/// # Request Body
///
/// ```json
/// {
///     "phone_number": "+15551234567",
///     "channel": "sms"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "message": "Verification code sent successfully",
///     "expires_in": 300,
///     "resend_after": 30
/// }
/// ```
///
/// ## Errors
/// - 400 `invalid_phone_format` / `validation_error`
/// - 409 `phone_already_registered`
/// - 429 `rate_limit_exceeded` (admission)
/// - 503 `delivery_failed`
pub async fn send_code(
    state: web::Data<AppState>,
    caller: CallerIdentity,
    request: web::Json<SendCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        log::warn!("Validation failed for send_code request: {:?}", errors);
        return validation_error(&errors);
    }

    let transport = match parse_channel(request.channel.as_deref()) {
        Ok(transport) => transport,
        Err(response) => return response,
    };

    match state
        .verification
        .issue_code(&request.phone_number, transport, caller.owner())
        .await
    {
        Ok(result) => issued_response(
            "Verification code sent successfully",
            result,
            state.verification.config(),
        ),
        Err(error) => handle_domain_error(error),
    }
}
