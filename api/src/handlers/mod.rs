pub mod error;
pub mod health;

pub use error::{handle_domain_error, json_error_handler, not_found, validation_error};
pub use health::health_check;
