//! Application state and factory
//!
//! This module holds the state shared by every handler and the route table.
//! The binary and the integration tests both go through [`create_app`].

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, Error,
};
use std::sync::Arc;

use pv_core::services::{ClientRateLimiter, VerificationService};
use pv_shared::config::{AppConfig, CorsConfig, RateLimitConfig};

use crate::handlers::{health_check, json_error_handler, not_found};
use crate::middleware::{create_cors, IssueRateLimiter};
use crate::routes::phone::{resend_code, send_code, verify_code};

/// State shared by all handlers
pub struct AppState {
    pub verification: Arc<VerificationService>,
    pub rate_limiter: Arc<dyn ClientRateLimiter>,
    pub rate_limit: RateLimitConfig,
    /// Header the identity gateway forwards the caller id in
    pub identity_header: String,
    pub max_payload_size: usize,
    pub cors: CorsConfig,
}

impl AppState {
    pub fn new(
        verification: Arc<VerificationService>,
        rate_limiter: Arc<dyn ClientRateLimiter>,
        config: &AppConfig,
    ) -> Self {
        Self {
            verification,
            rate_limiter,
            rate_limit: config.rate_limit.clone(),
            identity_header: config.identity.header.clone(),
            max_payload_size: config.server.max_payload_size,
            cors: config.cors.clone(),
        }
    }
}

/// Register the verification routes under `/api/v1/phone`
///
/// Issuance routes sit behind the per-client admission limiter; validation
/// is bounded per code by the service.
pub fn configure(state: &web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    move |cfg: &mut web::ServiceConfig| {
        let admission = IssueRateLimiter::new(state.rate_limiter.clone(), &state.rate_limit);

        cfg.service(
            web::scope("/api/v1/phone")
                .service(
                    web::resource("/send-code")
                        .wrap(admission.clone())
                        .route(web::post().to(send_code)),
                )
                .service(
                    web::resource("/resend-code")
                        .wrap(admission)
                        .route(web::post().to(resend_code)),
                )
                .route("/verify-code", web::post().to(verify_code)),
        );
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let cors = create_cors(&state.cors);
    let json_config = web::JsonConfig::default()
        .limit(state.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(state.clone())
        .app_data(json_config)
        .wrap(cors)
        .wrap(Logger::default())
        .route("/health", web::get().to(health_check))
        .configure(configure(&state))
        .default_service(web::route().to(|| async { not_found() }))
}
