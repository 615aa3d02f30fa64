//! Configuration for the OTP service

use crate::services::hashing::DEFAULT_HASH_COST;

/// Deployment environment the service runs in
///
/// Development mode echoes the plaintext passcode back in the issuance
/// result for test convenience; production never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development and automated tests
    Development,
    /// Live deployment
    Production,
}

impl Environment {
    /// Whether development-only diagnostics are enabled
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Company name substituted into every email template
    pub company_name: String,
    /// Deployment environment
    pub environment: Environment,
    /// Bcrypt cost factor for passcode hashes
    pub hash_cost: u32,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            company_name: "MailGate".to_string(),
            environment: Environment::Production,
            hash_cost: DEFAULT_HASH_COST,
        }
    }
}
