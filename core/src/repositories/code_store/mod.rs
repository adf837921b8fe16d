pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use r#trait::{cooldown_wait_seconds, AttemptOutcome, CodeStore, ReplaceOutcome};
