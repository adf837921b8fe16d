use actix_web::{web, HttpResponse};
use pv_shared::types::ApiResponse;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::{handle_domain_error, validation_error};
use crate::middleware::CallerIdentity;

/// Handler for POST /api/v1/phone/verify-code
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "verified": true,
///     "phone_number": "+15551234567"
/// }
/// ```
///
/// ## Errors
/// - 400 `incorrect_code` with `remaining_attempts`
/// - 404 `code_not_found`
/// - 410 `code_expired`
/// - 429 `attempts_exhausted`
pub async fn verify_code(
    state: web::Data<AppState>,
    caller: CallerIdentity,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        log::warn!("Validation failed for verify_code request: {:?}", errors);
        return validation_error(&errors);
    }

    match state
        .verification
        .validate_code(&request.phone_number, &request.code, caller.owner())
        .await
    {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::success(VerifyCodeResponse {
            verified: true,
            phone_number: result.phone_number.to_string(),
        })),
        Err(error) => handle_domain_error(error),
    }
}
