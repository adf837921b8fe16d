//! Value objects representing immutable domain concepts.

pub mod owner_id;
pub mod phone_number;
pub mod transport;

pub use owner_id::OwnerId;
pub use phone_number::PhoneNumber;
pub use transport::Transport;
