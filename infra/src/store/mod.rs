//! In-memory repository implementations
//!
//! Reference stores for development, demos, and integration tests. The OTP
//! store enforces the same invariants a production store must: at most one
//! record per user and version-checked updates.

pub mod otp;
pub mod user;

pub use otp::InMemoryOtpStore;
pub use user::InMemoryUserStore;
