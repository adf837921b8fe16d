//! Per-client admission limiting for the issuance endpoints
//!
//! Every send and resend costs a message, so each client address gets a
//! sliding window of issuance requests. The window itself lives behind
//! [`ClientRateLimiter`] and is shared across processes when Redis is used.
//! Validation attempts are bounded per code by the service, not here.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use pv_core::services::{ClientRateLimiter, RateLimitDecision};
use pv_shared::config::RateLimitConfig;
use pv_shared::errors::{error_codes, ErrorResponse};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    time::Duration,
};

/// Rate limiter middleware factory
#[derive(Clone)]
pub struct IssueRateLimiter {
    limiter: Arc<dyn ClientRateLimiter>,
    settings: Rc<Settings>,
}

#[derive(Debug)]
struct Settings {
    enabled: bool,
    limit: u32,
    window: Duration,
}

impl IssueRateLimiter {
    pub fn new(limiter: Arc<dyn ClientRateLimiter>, config: &RateLimitConfig) -> Self {
        Self {
            limiter,
            settings: Rc::new(Settings {
                enabled: config.enabled,
                limit: config.issue_per_address,
                window: Duration::from_secs(config.issue_window_seconds),
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IssueRateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = IssueRateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IssueRateLimiterMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            settings: self.settings.clone(),
        }))
    }
}

/// Rate limiter middleware service
pub struct IssueRateLimiterMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<dyn ClientRateLimiter>,
    settings: Rc<Settings>,
}

impl<S, B> Service<ServiceRequest> for IssueRateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();
        let settings = self.settings.clone();

        Box::pin(async move {
            if !settings.enabled {
                return service.call(req).await.map(|res| res.map_into_left_body());
            }

            let key = format!("issue:{}", client_ip(req.request()));

            match limiter
                .check_and_record(&key, settings.limit, settings.window)
                .await
            {
                Ok(RateLimitDecision::Limited { retry_after_seconds }) => {
                    log::warn!(
                        "Issuance rate limit exceeded for {} on {}",
                        key,
                        req.path()
                    );
                    let response = rate_limited_response(retry_after_seconds);
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(RateLimitDecision::Allowed { remaining }) => {
                    log::debug!("Issuance admitted for {}, {} remaining", key, remaining);
                }
                // Admission is abuse protection on top of the per-number cooldown,
                // so a limiter outage lets the request through
                Err(e) => {
                    log::error!("Rate limiter unavailable, admitting request: {}", e);
                }
            }

            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

fn rate_limited_response(retry_after_seconds: u64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
        .json(
            ErrorResponse::new(
                error_codes::RATE_LIMIT_EXCEEDED,
                format!(
                    "Too many requests. Please try again in {} seconds",
                    retry_after_seconds
                ),
            )
            .add_detail("retry_after", retry_after_seconds),
        )
}

/// Client address as seen through the load balancer
///
/// Order: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
pub fn client_ip(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = req
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
