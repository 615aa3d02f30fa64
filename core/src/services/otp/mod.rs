//! OTP service module for email-based verification
//!
//! This module provides the complete passcode workflow:
//! - Issuance gated by a progressive cooldown and a rolling attempt window
//! - Email delivery with bounded retry before any state is committed
//! - Verification that consumes the passcode and marks the user verified
//! - A best-effort welcome email after successful verification

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::{Environment, OtpServiceConfig};
pub use service::OtpService;
pub use types::{OtpIssued, OtpPurpose, OtpVerified};
