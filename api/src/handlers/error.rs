//! Mapping of domain outcomes to HTTP responses
//!
//! Expected verification outcomes keep their own message and code; delivery
//! and internal faults are logged with their detail and answered generically.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use pv_core::errors::{DomainError, VerificationError};
use pv_shared::errors::{error_codes, ErrorResponse};
use validator::ValidationErrors;

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Verification(outcome) => handle_verification_outcome(outcome),
        DomainError::DeliveryFailed { message } => {
            log::error!("Code delivery failed: {}", message);
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::DELIVERY_FAILED,
                "Failed to send verification code. Please try again later",
            ))
        }
        DomainError::Internal { message } => {
            log::error!("Internal error: {}", message);
            internal_error()
        }
    }
}

fn handle_verification_outcome(outcome: VerificationError) -> HttpResponse {
    log::info!("Verification outcome: {}", outcome);
    let message = outcome.to_string();

    match outcome {
        VerificationError::InvalidPhoneFormat { .. } => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::INVALID_PHONE_FORMAT, message),
        ),
        VerificationError::PhoneAlreadyRegistered => HttpResponse::Conflict().json(
            ErrorResponse::new(error_codes::PHONE_ALREADY_REGISTERED, message),
        ),
        VerificationError::NotFound => HttpResponse::NotFound()
            .json(ErrorResponse::new(error_codes::CODE_NOT_FOUND, message)),
        VerificationError::Expired => {
            HttpResponse::Gone().json(ErrorResponse::new(error_codes::CODE_EXPIRED, message))
        }
        VerificationError::Exhausted => HttpResponse::TooManyRequests().json(
            ErrorResponse::new(error_codes::ATTEMPTS_EXHAUSTED, message),
        ),
        VerificationError::Incorrect { remaining_attempts } => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::INCORRECT_CODE, message)
                .add_detail("remaining_attempts", remaining_attempts),
        ),
        VerificationError::Throttled { wait_seconds } => HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, wait_seconds.to_string()))
            .json(
                ErrorResponse::new(error_codes::RESEND_THROTTLED, message)
                    .add_detail("wait_seconds", wait_seconds),
            ),
    }
}

/// 400 with the failing fields listed under `details`
pub fn validation_error(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field, messages);
    }

    HttpResponse::BadRequest().json(response)
}

/// Malformed or oversized JSON bodies get the same envelope as everything else
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON payload: {}", err);
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        format!("Invalid JSON payload: {}", err),
    ));
    InternalError::from_response(err, response).into()
}

pub fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

pub fn internal_error() -> HttpResponse {
    HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).json(ErrorResponse::new(
        error_codes::INTERNAL_ERROR,
        "An internal error occurred",
    ))
}
