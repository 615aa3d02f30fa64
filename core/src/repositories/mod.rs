//! Repository interfaces for the persistence collaborators of the OTP core.

pub mod otp;
pub mod user;

pub use otp::OtpRepository;
pub use user::UserRepository;

#[cfg(test)]
pub use otp::MockOtpRepository;
#[cfg(test)]
pub use user::MockUserRepository;
