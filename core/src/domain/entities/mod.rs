//! Domain entities representing core business objects.

pub mod verification_record;

pub use verification_record::{
    verification_message, VerificationRecord, CODE_LENGTH, DEFAULT_CODE_TTL_SECONDS,
    DEFAULT_RESEND_COOLDOWN_SECONDS, MAX_ATTEMPTS,
};
