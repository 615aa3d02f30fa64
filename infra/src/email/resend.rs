//! Resend email provider implementation
//!
//! Sends templated emails through the Resend HTTP API. Templates are
//! registered locally under their aliases and rendered before the request;
//! the provider validates an alias without any network call, so a
//! misconfigured template never consumes a send attempt upstream.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use otp_core::services::dispatch::{mask_email, EmailMessage, EmailProvider};

use crate::InfrastructureError;

/// Resend API configuration
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// API key for bearer authentication
    pub api_key: String,
    /// Sender address, e.g. "MailGate <no-reply@mailgate.io>"
    pub from_address: String,
    /// API base URL
    pub base_url: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl ResendConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("RESEND_API_KEY")
            .map_err(|_| InfrastructureError::Config("RESEND_API_KEY not set".to_string()))?;
        let from_address = std::env::var("RESEND_FROM_ADDRESS")
            .map_err(|_| InfrastructureError::Config("RESEND_FROM_ADDRESS not set".to_string()))?;

        Ok(Self {
            api_key,
            from_address,
            base_url: std::env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            request_timeout_secs: std::env::var("RESEND_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// Resend email provider
pub struct ResendEmailProvider {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendEmailProvider {
    /// Create a new Resend provider
    pub fn new(config: ResendConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_email(&config.from_address),
            "Resend email provider initialized"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(ResendConfig::from_env()?)
    }

    /// Body registered under a template alias, if any
    fn template_body(alias: &str) -> Option<&'static str> {
        match alias {
            "email-verification-code" => Some(
                "<p>Hello from {{COMPANY}},</p>\
                 <p>Your verification code is <strong>{{VERIFICATION_CODE}}</strong>.</p>\
                 <p>It expires in 30 minutes.</p>",
            ),
            "password-reset-code" => Some(
                "<p>Hello from {{COMPANY}},</p>\
                 <p>Your password reset code is <strong>{{VERIFICATION_CODE}}</strong>.</p>\
                 <p>It expires in 30 minutes.</p>",
            ),
            "welcome-message" => Some(
                "<p>Welcome to {{COMPANY}}, {{USER_NAME}}!</p>\
                 <p>Your email address has been verified.</p>",
            ),
            _ => None,
        }
    }

    /// Render a template body with the message variables substituted
    fn render(body: &str, variables: &HashMap<String, String>) -> String {
        let mut rendered = body.to_string();
        for (key, value) in variables {
            rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
        }
        rendered
    }
}

#[async_trait]
impl EmailProvider for ResendEmailProvider {
    async fn get_template(&self, alias: &str) -> Result<(), String> {
        match Self::template_body(alias) {
            Some(_) => Ok(()),
            None => Err(format!("template '{}' is not registered", alias)),
        }
    }

    async fn send(&self, message: &EmailMessage) -> Result<String, String> {
        let alias = message.template.alias();
        let body = Self::template_body(alias)
            .ok_or_else(|| format!("template '{}' is not registered", alias))?;
        let html = Self::render(body, &message.variables);

        debug!(
            to = %mask_email(&message.to),
            template = alias,
            "Posting email to Resend"
        );

        let response = self
            .client
            .post(format!("{}/emails", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "from": self.config.from_address,
                "to": [message.to],
                "subject": message.subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                to = %mask_email(&message.to),
                template = alias,
                status = status.as_u16(),
                "Resend rejected the message"
            );
            return Err(format!("provider returned {}: {}", status, detail));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("malformed provider response: {}", e))?;
        payload
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| "provider response carried no message id".to_string())
    }
}
