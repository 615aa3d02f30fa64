//! Types for email dispatch requests and outcomes

use std::collections::HashMap;
use std::time::Duration;

/// Registered email templates known to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Passcode email for account verification
    VerificationCode,
    /// Passcode email for password reset
    PasswordReset,
    /// Greeting sent after a successful verification
    Welcome,
}

impl EmailTemplate {
    /// Provider-side alias the template is registered under
    pub fn alias(&self) -> &'static str {
        match self {
            EmailTemplate::VerificationCode => "email-verification-code",
            EmailTemplate::PasswordReset => "password-reset-code",
            EmailTemplate::Welcome => "welcome-message",
        }
    }
}

/// A templated email ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Template to render
    pub template: EmailTemplate,
    /// Substitution variables for the template
    pub variables: HashMap<String, String>,
}

impl EmailMessage {
    /// Builds a passcode email
    pub fn passcode(
        to: &str,
        subject: &str,
        template: EmailTemplate,
        company: &str,
        code: &str,
    ) -> Self {
        let mut variables = HashMap::new();
        variables.insert("COMPANY".to_string(), company.to_string());
        variables.insert("VERIFICATION_CODE".to_string(), code.to_string());
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            template,
            variables,
        }
    }

    /// Builds the welcome email sent after a successful verification
    pub fn welcome(to: &str, company: &str, user_name: &str) -> Self {
        let mut variables = HashMap::new();
        variables.insert("COMPANY".to_string(), company.to_string());
        variables.insert("USER_NAME".to_string(), user_name.to_string());
        Self {
            to: to.to_string(),
            subject: "Welcome on board".to_string(),
            template: EmailTemplate::Welcome,
            variables,
        }
    }
}

/// Result of a single send attempt against the provider
#[derive(Debug, Clone)]
pub enum DispatchResult {
    /// The provider accepted the message
    Sent {
        /// Provider-assigned message ID
        message_id: String,
    },
    /// The provider rejected the message or was unreachable
    Failed {
        /// Provider error detail, kept out of caller-facing messages
        reason: String,
    },
}

/// Final outcome of a dispatch including retries
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Whether the message was accepted within the attempt budget
    pub success: bool,
    /// Provider-assigned message ID on success
    pub message_id: Option<String>,
    /// Error detail of the last failed attempt
    pub error: Option<String>,
    /// Number of send attempts actually made
    pub attempts_used: u32,
}

/// Retry budget and pacing for a dispatch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total send attempts allowed, including the first
    pub max_attempts: u32,
    /// Delay before the next attempt
    pub base_delay: Duration,
    /// When set, the delay doubles after every failed attempt
    pub exponential: bool,
}

impl RetryPolicy {
    /// Policy for passcode emails: three attempts with a flat 2 second pause
    pub fn otp() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            exponential: false,
        }
    }

    /// Single attempt, no pause; used for non-critical notifications
    pub fn best_effort() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential: false,
        }
    }

    /// Policy with exponentially growing delays between attempts
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            exponential: true,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if self.exponential {
            self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
        } else {
            self.base_delay
        }
    }
}
