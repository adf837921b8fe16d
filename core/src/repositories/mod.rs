//! Repository interfaces implemented by the infrastructure layer.

pub mod code_store;
pub mod user_directory;

pub use code_store::{cooldown_wait_seconds, AttemptOutcome, CodeStore, ReplaceOutcome};
pub use user_directory::UserDirectory;
