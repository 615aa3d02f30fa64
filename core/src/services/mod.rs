//! Business services containing domain logic and use cases.

pub mod dispatch;
pub mod hashing;
pub mod otp;

// Re-export commonly used types
pub use dispatch::{
    DispatchOutcome, DispatchResult, EmailMessage, EmailProvider, EmailTemplate, Mailer,
    RetryPolicy,
};
pub use hashing::CodeHasher;
pub use otp::{Environment, OtpIssued, OtpPurpose, OtpService, OtpServiceConfig, OtpVerified};
