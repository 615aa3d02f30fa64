//! Error types for OTP issuance, throttling, and verification
//!
//! Every error carries a stable machine code and a coarse category so the
//! presentation layer can map it onto a transport response without matching
//! on message text. The messages themselves are the user-facing wording.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of OTP errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input was missing or malformed
    Validation,
    /// The referenced user or passcode does not exist
    NotFound,
    /// A throttling gate rejected the request
    RateLimited,
    /// The email provider could not deliver the message
    Delivery,
    /// Unexpected internal failure
    Internal,
}

impl ErrorCategory {
    /// HTTP status this category maps to, without binding to a web framework
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::RateLimited => 429,
            ErrorCategory::Delivery => 500,
            ErrorCategory::Internal => 500,
        }
    }
}

/// OTP workflow errors
///
/// Throttling rejections carry the data a caller needs to tell the user when
/// to retry. Delivery failures deliberately carry no provider detail; that
/// goes to the failure log channel instead.
#[derive(Error, Debug)]
pub enum OtpError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address format")]
    InvalidEmail,

    #[error("Invalid OTP format. Must be 6 digits")]
    InvalidCodeFormat,

    #[error("User not found")]
    UserNotFound,

    #[error("No OTP found. Please request a new one")]
    NoActiveOtp,

    #[error("OTP has expired. Please request a new one")]
    OtpExpired,

    #[error("Invalid OTP. Please try again")]
    CodeMismatch,

    #[error("{}", wait_hint(.retry_after))]
    CooldownActive { retry_after: Duration },

    #[error("Maximum attempts ({limit}) reached. Please try again at {}", .resets_at.format("%H:%M:%S UTC"))]
    AttemptCapReached {
        limit: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("Failed to send OTP email. Please try again later.")]
    DeliveryFailed,
}

impl OtpError {
    /// Stable machine code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            OtpError::MissingEmail => "EMAIL_REQUIRED",
            OtpError::InvalidEmail => "INVALID_EMAIL",
            OtpError::InvalidCodeFormat => "INVALID_OTP_FORMAT",
            OtpError::UserNotFound => "USER_NOT_FOUND",
            OtpError::NoActiveOtp => "OTP_NOT_FOUND",
            OtpError::OtpExpired => "OTP_EXPIRED",
            OtpError::CodeMismatch => "INVALID_OTP",
            OtpError::CooldownActive { .. } => "OTP_COOLDOWN",
            OtpError::AttemptCapReached { .. } => "OTP_ATTEMPT_LIMIT",
            OtpError::DeliveryFailed => "EMAIL_DELIVERY_FAILED",
        }
    }

    /// Category the error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            OtpError::MissingEmail
            | OtpError::InvalidEmail
            | OtpError::InvalidCodeFormat
            | OtpError::OtpExpired
            | OtpError::CodeMismatch => ErrorCategory::Validation,
            OtpError::UserNotFound | OtpError::NoActiveOtp => ErrorCategory::NotFound,
            OtpError::CooldownActive { .. } | OtpError::AttemptCapReached { .. } => {
                ErrorCategory::RateLimited
            }
            OtpError::DeliveryFailed => ErrorCategory::Delivery,
        }
    }
}

/// Render a remaining cooldown as user-facing wait text.
///
/// Waits under a minute are shown in seconds, longer waits in whole minutes,
/// both rounded up so the hinted wait is never shorter than the real one.
fn wait_hint(retry_after: &Duration) -> String {
    let ms = retry_after.num_milliseconds();
    if ms < 60_000 {
        let seconds = ((ms + 999) / 1000).max(1);
        format!(
            "Please wait {} second{} before requesting a new OTP",
            seconds,
            if seconds == 1 { "" } else { "s" }
        )
    } else {
        let minutes = (ms + 59_999) / 60_000;
        format!(
            "Please wait {} minute{} before requesting a new OTP",
            minutes,
            if minutes == 1 { "" } else { "s" }
        )
    }
}

/// Unified error response structure for transport layers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

/// Convert OtpError to ErrorResponse
impl From<OtpError> for ErrorResponse {
    fn from(err: OtpError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

/// Convert DomainError to ErrorResponse
impl From<super::DomainError> for ErrorResponse {
    fn from(err: super::DomainError) -> Self {
        use super::DomainError;
        let code = match &err {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Conflict { .. } => "CONFLICT",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Otp(inner) => inner.code(),
        };
        ErrorResponse::new(code, err.to_string())
    }
}
