//! # MailGate Infrastructure Layer
//!
//! Concrete adapters behind the interfaces `otp_core` consumes:
//!
//! - **Email**: a Resend-shaped HTTP provider for production and a mock
//!   provider for development and testing
//! - **Store**: in-memory versioned implementations of the user and OTP
//!   record repositories, enforcing the one-record-per-user and
//!   conditional-update invariants

/// Email provider module - HTTP and mock providers
pub mod email;

/// Store module - in-memory repository implementations
pub mod store;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email provider error
    #[error("Email provider error: {0}")]
    Provider(String),
}
