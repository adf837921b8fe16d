//! Business services containing domain logic and use cases.

pub mod clock;
pub mod rate_limiter;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limiter::{ClientRateLimiter, RateLimitDecision};
pub use verification::{
    DeliveryChannel, IssueCodeResult, ValidateCodeResult, VerificationService,
    VerificationServiceConfig,
};
