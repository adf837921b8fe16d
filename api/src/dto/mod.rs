//! Request and response bodies

pub mod phone;

pub use phone::*;
