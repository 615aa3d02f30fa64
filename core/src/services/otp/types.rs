//! Types for OTP service results

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::dispatch::EmailTemplate;

/// What the requested passcode is for
///
/// Both purposes share one issuance flow; only the template and subject
/// line differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    /// First-time account verification after registration
    AccountVerification,
    /// Password reset for an existing account
    PasswordReset,
}

impl OtpPurpose {
    /// Email template carrying the passcode for this purpose
    pub fn template(&self) -> EmailTemplate {
        match self {
            OtpPurpose::AccountVerification => EmailTemplate::VerificationCode,
            OtpPurpose::PasswordReset => EmailTemplate::PasswordReset,
        }
    }

    /// Subject line for the passcode email
    pub fn subject(&self) -> &'static str {
        match self {
            OtpPurpose::AccountVerification => "Account Verification OTP",
            OtpPurpose::PasswordReset => "Password Reset OTP",
        }
    }
}

/// Result of a successful passcode issuance
#[derive(Debug, Clone)]
pub struct OtpIssued {
    /// Provider-assigned message ID of the delivered email
    pub message_id: String,
    /// When the passcode expires
    pub expires_at: DateTime<Utc>,
    /// Human-readable validity window ("30 minutes")
    pub expires_in: String,
    /// Plaintext passcode, echoed in development mode only
    pub debug_code: Option<String>,
}

/// Result of a successful passcode verification
#[derive(Debug, Clone)]
pub struct OtpVerified {
    /// The user whose email address is now verified
    pub user_id: Uuid,
}
