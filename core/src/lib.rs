//! # MailGate Core
//!
//! Core business logic and domain layer for the MailGate backend.
//! This crate contains the OTP record entity and its gating rules, the
//! email dispatch engine with bounded retry, the issuance and verification
//! services, repository interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
