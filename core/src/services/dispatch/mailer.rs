//! Email dispatch engine with bounded retry.

use std::sync::Arc;

use super::email_utils::mask_email;
use super::traits::EmailProvider;
use super::types::{DispatchOutcome, DispatchResult, EmailMessage, RetryPolicy};

/// Sends templated emails through a provider with a bounded retry budget
///
/// The mailer validates the template registration before the first attempt;
/// a missing template is a configuration fault and is never retried. Send
/// failures are retried up to the policy's attempt budget with a pause
/// between attempts, and every failure is logged with the provider detail
/// while the returned outcome stays generic.
pub struct Mailer<P: EmailProvider> {
    provider: Arc<P>,
}

impl<P: EmailProvider> Clone for Mailer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: EmailProvider> Mailer<P> {
    /// Creates a mailer on top of an email provider
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Dispatches a message, retrying per the given policy
    ///
    /// # Arguments
    ///
    /// * `message` - The templated email to send
    /// * `policy` - Attempt budget and pacing between attempts
    ///
    /// # Returns
    ///
    /// A [`DispatchOutcome`] describing whether the provider accepted the
    /// message and how many attempts were spent
    pub async fn send(&self, message: &EmailMessage, policy: &RetryPolicy) -> DispatchOutcome {
        let alias = message.template.alias();

        if let Err(reason) = self.provider.get_template(alias).await {
            tracing::error!(
                template = alias,
                error = %reason,
                event = "email_template_missing",
                "Email template is not registered with the provider"
            );
            return DispatchOutcome {
                success: false,
                message_id: None,
                error: Some(reason),
                attempts_used: 0,
            };
        }

        let mut last_error: Option<String> = None;

        for attempt in 1..=policy.max_attempts {
            match self.try_send(message).await {
                DispatchResult::Sent { message_id } => {
                    tracing::info!(
                        to = %mask_email(&message.to),
                        template = alias,
                        message_id = %message_id,
                        attempt = attempt,
                        event = "email_sent",
                        "Email accepted by provider"
                    );
                    return DispatchOutcome {
                        success: true,
                        message_id: Some(message_id),
                        error: None,
                        attempts_used: attempt,
                    };
                }
                DispatchResult::Failed { reason } => {
                    tracing::warn!(
                        to = %mask_email(&message.to),
                        template = alias,
                        attempt = attempt,
                        max_attempts = policy.max_attempts,
                        error = %reason,
                        event = "email_attempt_failed",
                        "Email send attempt failed"
                    );
                    last_error = Some(reason);
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        tracing::error!(
            to = %mask_email(&message.to),
            template = alias,
            attempts = policy.max_attempts,
            error = %last_error.as_deref().unwrap_or("unknown"),
            event = "email_retries_exhausted",
            "Email delivery failed after all retry attempts"
        );
        DispatchOutcome {
            success: false,
            message_id: None,
            error: last_error,
            attempts_used: policy.max_attempts,
        }
    }

    async fn try_send(&self, message: &EmailMessage) -> DispatchResult {
        match self.provider.send(message).await {
            Ok(message_id) => DispatchResult::Sent { message_id },
            Err(reason) => DispatchResult::Failed { reason },
        }
    }
}
