//! Verification service module for phone-number OTP verification
//!
//! This module provides the complete verification code workflow:
//! - Code generation and delivery over SMS or WhatsApp
//! - Code validation with atomic attempt tracking
//! - Per-number resend cooldown
//! - Cross-account phone uniqueness through the user directory

mod config;
mod service;
mod traits;
mod types;


pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::DeliveryChannel;
pub use types::{IssueCodeResult, ValidateCodeResult};
