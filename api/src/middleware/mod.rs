pub mod cors;
pub mod identity;
pub mod rate_limit;

pub use cors::create_cors;
pub use identity::CallerIdentity;
pub use rate_limit::{client_ip, IssueRateLimiter};
