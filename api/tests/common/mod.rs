//! Shared fixture for the HTTP tests
#![allow(dead_code)]

use actix_web::web;
use chrono::Utc;
use std::sync::Arc;

use pv_api::app::AppState;
use pv_api::config::service_config;
use pv_core::services::{ManualClock, VerificationService};
use pv_infra::{InMemoryCodeStore, InMemoryRateLimiter, InMemoryUserDirectory, LoggingDeliveryChannel};
use pv_shared::config::AppConfig;

pub const PHONE: &str = "+15551234567";

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub channel: Arc<LoggingDeliveryChannel>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub clock: Arc<ManualClock>,
}

/// Development config with admission limiting switched off
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.rate_limit.enabled = false;
    config
}

pub fn context() -> TestContext {
    context_with(test_config(), InMemoryUserDirectory::new())
}

pub fn context_with(config: AppConfig, directory: InMemoryUserDirectory) -> TestContext {
    let service_config = service_config(&config);
    let channel = Arc::new(LoggingDeliveryChannel::new(service_config.validity_minutes()));
    let directory = Arc::new(directory);
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let verification = Arc::new(VerificationService::with_clock(
        Arc::new(InMemoryCodeStore::new(service_config.resend_cooldown())),
        channel.clone(),
        directory.clone(),
        clock.clone(),
        service_config,
    ));
    let state = web::Data::new(AppState::new(
        verification,
        Arc::new(InMemoryRateLimiter::new()),
        &config,
    ));

    TestContext {
        state,
        channel,
        directory,
        clock,
    }
}

/// A six-digit code guaranteed to differ from `code`
pub fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}
