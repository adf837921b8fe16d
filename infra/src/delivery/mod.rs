//! Delivery channels
//!
//! Both channels render the same message and address it through
//! [`Transport`](pv_core::domain::Transport); only the hand-off differs.

pub mod logging;
pub mod twilio;


pub use logging::LoggingDeliveryChannel;
pub use twilio::TwilioDeliveryChannel;
