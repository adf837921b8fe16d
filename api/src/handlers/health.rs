use actix_web::HttpResponse;
use chrono::Utc;
use pv_shared::types::{HealthResponse, HealthStatus};

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: HealthStatus::Healthy,
        service: "phone-verification".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
