//! Domain entities representing core business objects.

pub mod otp;
pub mod user;

// Re-export commonly used types
pub use otp::{
    OtpRecord,
    ATTEMPT_WINDOW_MINUTES, CODE_LENGTH, COOLDOWN_UNIT_SECONDS,
    MAX_ATTEMPTS_PER_WINDOW, OTP_VALIDITY_MINUTES,
};
pub use user::User;
