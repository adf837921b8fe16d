//! # Phone Verification Core
//!
//! Core business logic and domain layer for phone-number verification.
//! This crate contains the verification record, value objects, the error
//! taxonomy, repository interfaces and the verification service.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
