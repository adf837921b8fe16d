//! CORS middleware configuration for cross-origin requests.
//!
//! Browser clients call the verification endpoints directly; the allowed
//! origins come from [`CorsConfig`] so each environment can list its own.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use pv_shared::config::CorsConfig;

/// Creates a CORS middleware instance from configuration.
///
/// A `*` entry in `allowed_origins` accepts any origin; credentials are
/// never combined with a wildcard.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        log::info!("Configuring CORS to allow any origin");
        return cors.allow_any_origin();
    }

    for origin in config.allowed_origins.iter().map(|o| o.trim()) {
        if !origin.is_empty() {
            log::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors
}
