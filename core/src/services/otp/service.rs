//! Main OTP service implementation
//!
//! Orchestrates the issuance gates (progressive cooldown, rolling
//! attempt-window cap), code generation, email dispatch, and the commit of
//! the hashed passcode, plus the verification flow that consumes it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing;
use uuid::Uuid;

use crate::domain::entities::otp::{
    OtpRecord, CODE_LENGTH, MAX_ATTEMPTS_PER_WINDOW, OTP_VALIDITY_MINUTES,
};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::repositories::{OtpRepository, UserRepository};
use crate::services::dispatch::{
    is_valid_email_format, mask_email, normalize_email, EmailMessage, EmailProvider, Mailer,
    RetryPolicy,
};
use crate::services::hashing::CodeHasher;

use super::config::OtpServiceConfig;
use super::types::{OtpIssued, OtpPurpose, OtpVerified};

/// Bounded number of commit rounds when racing concurrent issuances
const MAX_COMMIT_ROUNDS: u32 = 3;

/// OTP service handling issuance, throttling, and verification of
/// email-delivered passcodes
///
/// Gating decisions are made against the stored record before any email is
/// sent, and the record is committed only after the provider accepted the
/// message. A failed dispatch therefore never consumes an attempt or starts
/// a cooldown.
pub struct OtpService<P, U, O>
where
    P: EmailProvider,
    U: UserRepository,
    O: OtpRepository,
{
    /// Dispatch engine wrapping the email provider
    mailer: Mailer<P>,
    /// User lookup collaborator
    users: Arc<U>,
    /// OTP record store
    otps: Arc<O>,
    /// Passcode hasher
    hasher: CodeHasher,
    /// Service configuration
    config: OtpServiceConfig,
}

impl<P, U, O> OtpService<P, U, O>
where
    P: EmailProvider + 'static,
    U: UserRepository,
    O: OtpRepository,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `provider` - Email provider implementation
    /// * `users` - User repository implementation
    /// * `otps` - OTP record repository implementation
    /// * `config` - Service configuration
    pub fn new(provider: Arc<P>, users: Arc<U>, otps: Arc<O>, config: OtpServiceConfig) -> Self {
        let hasher = CodeHasher::new(config.hash_cost);
        Self {
            mailer: Mailer::new(provider),
            users,
            otps,
            hasher,
            config,
        }
    }

    /// Issue a new passcode and deliver it by email
    ///
    /// Evaluates the cooldown and attempt-window gates against the stored
    /// record, generates a fresh code, dispatches it with the fixed-delay
    /// retry policy, and commits the hashed code only after the provider
    /// accepted the message.
    ///
    /// # Arguments
    ///
    /// * `email` - Address of the user requesting a passcode
    /// * `purpose` - Selects the email template and subject
    ///
    /// # Returns
    ///
    /// * `Ok(OtpIssued)` - Delivery message ID and expiry details
    /// * `Err(DomainError)` - Validation, gating, or delivery failure
    pub async fn request_otp(&self, email: &str, purpose: OtpPurpose) -> DomainResult<OtpIssued> {
        let email = self.validate_email(email)?;
        let user = self.resolve_user(&email).await?;
        let now = Utc::now();

        let existing = self.otps.find_by_user(user.id).await?;

        if let Some(record) = &existing {
            // Cooldown applies only while the current passcode is still
            // live; an expired one makes the re-request free
            if !record.is_expired(now) {
                if let Some(remaining) = record.cooldown_remaining(now) {
                    tracing::warn!(
                        user_id = %user.id,
                        email = %mask_email(&email),
                        retry_after_secs = remaining.num_seconds(),
                        event = "otp_cooldown_active",
                        "Passcode request rejected by cooldown gate"
                    );
                    return Err(OtpError::CooldownActive {
                        retry_after: remaining,
                    }
                    .into());
                }
            }

            if record.attempts_in_window(now) >= MAX_ATTEMPTS_PER_WINDOW {
                tracing::warn!(
                    user_id = %user.id,
                    email = %mask_email(&email),
                    attempts = record.attempts,
                    resets_at = %record.window_resets_at(),
                    event = "otp_attempt_cap_reached",
                    "Passcode request rejected by attempt-window gate"
                );
                return Err(OtpError::AttemptCapReached {
                    limit: MAX_ATTEMPTS_PER_WINDOW,
                    resets_at: record.window_resets_at(),
                }
                .into());
            }
        }

        let code = OtpRecord::generate_code(CODE_LENGTH);
        let message = EmailMessage::passcode(
            &user.email,
            purpose.subject(),
            purpose.template(),
            &self.config.company_name,
            &code,
        );

        let outcome = self.mailer.send(&message, &RetryPolicy::otp()).await;
        if !outcome.success {
            // Dedicated alerting channel; the caller only gets the generic
            // delivery error
            tracing::error!(
                target: "otp_failed_email",
                user_id = %user.id,
                email = %mask_email(&user.email),
                user_name = %user.name,
                template = message.template.alias(),
                retry_attempts = outcome.attempts_used,
                failure_reason = %outcome.error.as_deref().unwrap_or("unknown"),
                event = "otp_email_failed",
                "OTP email failed after retries"
            );
            return Err(OtpError::DeliveryFailed.into());
        }

        let code_hash = self.hasher.hash(&code)?;
        let record = self.commit_issuance(user.id, existing, code_hash, now).await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            attempts = record.attempts,
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Passcode issued and delivered"
        );

        Ok(OtpIssued {
            message_id: outcome.message_id.unwrap_or_default(),
            expires_at: record.expires_at,
            expires_in: format!("{} minutes", OTP_VALIDITY_MINUTES),
            debug_code: self
                .config
                .environment
                .is_development()
                .then_some(code),
        })
    }

    /// Verify a passcode and consume it on match
    ///
    /// A mismatch leaves the record and its counters untouched; an expired
    /// record is deleted on sight. A match deletes the record, marks the
    /// user's email verified, and fires a best-effort welcome email that
    /// never affects the returned result.
    ///
    /// # Arguments
    ///
    /// * `email` - Address of the user verifying
    /// * `code` - The passcode as entered by the user
    ///
    /// # Returns
    ///
    /// * `Ok(OtpVerified)` - The user id whose email is now verified
    /// * `Err(DomainError)` - Validation failure or rejected code
    pub async fn verify_otp(&self, email: &str, code: &str) -> DomainResult<OtpVerified> {
        // Shape check before any lookup
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::InvalidCodeFormat.into());
        }

        let email = self.validate_email(email)?;
        let user = self.resolve_user(&email).await?;

        let record = self
            .otps
            .find_by_user(user.id)
            .await?
            .ok_or(OtpError::NoActiveOtp)?;

        let now = Utc::now();
        if record.is_expired(now) {
            self.otps.delete(record.id).await?;
            tracing::info!(
                user_id = %user.id,
                email = %mask_email(&email),
                expired_at = %record.expires_at,
                event = "otp_expired",
                "Expired passcode deleted during verification"
            );
            return Err(OtpError::OtpExpired.into());
        }

        if !self.hasher.verify(code, &record.code_hash)? {
            tracing::warn!(
                user_id = %user.id,
                email = %mask_email(&email),
                event = "otp_mismatch",
                "Passcode did not match"
            );
            return Err(OtpError::CodeMismatch.into());
        }

        self.otps.delete(record.id).await?;
        self.users.mark_email_verified(user.id).await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&email),
            event = "otp_verified",
            "Passcode verified and consumed"
        );

        self.spawn_welcome_email(&user);

        Ok(OtpVerified { user_id: user.id })
    }

    /// Normalize and validate an email address
    fn validate_email(&self, email: &str) -> DomainResult<String> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(OtpError::MissingEmail.into());
        }
        if !is_valid_email_format(&email) {
            return Err(OtpError::InvalidEmail.into());
        }
        Ok(email)
    }

    /// Look up the user behind a normalized email address
    async fn resolve_user(&self, email: &str) -> DomainResult<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| OtpError::UserNotFound.into())
    }

    /// Commit the delivered passcode to the record store
    ///
    /// Creates the record on first issuance or applies `record_issuance` to
    /// the existing one. On a version conflict the fresh state is re-read
    /// and only the attempt cap is re-checked: the racing request already
    /// dispatched an email, so its issuance must count toward the cap, while
    /// the cooldown was a pacing decision each request made against the
    /// state it observed.
    async fn commit_issuance(
        &self,
        user_id: Uuid,
        existing: Option<OtpRecord>,
        code_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<OtpRecord> {
        let mut current = existing;

        for round in 0..MAX_COMMIT_ROUNDS {
            if round > 0 {
                if let Some(record) = &current {
                    if record.attempts_in_window(now) >= MAX_ATTEMPTS_PER_WINDOW {
                        return Err(OtpError::AttemptCapReached {
                            limit: MAX_ATTEMPTS_PER_WINDOW,
                            resets_at: record.window_resets_at(),
                        }
                        .into());
                    }
                }
            }

            let attempt = match current.take() {
                None => {
                    let record = OtpRecord::new(user_id, code_hash.clone(), now);
                    self.otps.create(record).await
                }
                Some(mut record) => {
                    record.record_issuance(code_hash.clone(), now);
                    self.otps.update(record).await
                }
            };

            match attempt {
                Ok(record) => return Ok(record),
                Err(DomainError::Conflict { .. }) | Err(DomainError::NotFound { .. }) => {
                    tracing::warn!(
                        user_id = %user_id,
                        round = round + 1,
                        event = "otp_commit_conflict",
                        "Concurrent update detected while committing passcode"
                    );
                    current = self.otps.find_by_user(user_id).await?;
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::Internal {
            message: "Failed to commit passcode record after repeated conflicts".to_string(),
        })
    }

    /// Fire the post-verification welcome email as a detached task
    ///
    /// Single best-effort attempt; a failure lands on the `failed_email`
    /// channel and never reaches the verifier.
    fn spawn_welcome_email(&self, user: &User) {
        let mailer = self.mailer.clone();
        let message = EmailMessage::welcome(&user.email, &self.config.company_name, &user.name);
        let user_id = user.id;

        tokio::spawn(async move {
            let outcome = mailer.send(&message, &RetryPolicy::best_effort()).await;
            if !outcome.success {
                tracing::error!(
                    target: "failed_email",
                    user_id = %user_id,
                    email = %mask_email(&message.to),
                    failure_reason = %outcome.error.as_deref().unwrap_or("unknown"),
                    event = "welcome_email_failed",
                    "Welcome email could not be delivered"
                );
            }
        });
    }
}
