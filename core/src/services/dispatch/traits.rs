//! Trait for email provider integration

use async_trait::async_trait;

use super::types::EmailMessage;

/// Trait for email provider integration
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Check that a template alias is registered with the provider
    async fn get_template(&self, alias: &str) -> Result<(), String>;
    /// Send a templated email, returning the provider message ID
    async fn send(&self, message: &EmailMessage) -> Result<String, String>;
}
