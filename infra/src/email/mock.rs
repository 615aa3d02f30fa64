//! Mock email provider for development and testing
//!
//! Records every message, prints passcodes to the console instead of
//! delivering them, and exposes switches that simulate provider failures
//! and missing templates.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use otp_core::services::dispatch::{mask_email, EmailMessage, EmailProvider};

/// Mock email provider
pub struct MockEmailProvider {
    /// Every message accepted so far, in send order
    sent_messages: Mutex<Vec<EmailMessage>>,
    /// Template aliases treated as unregistered
    missing_templates: Mutex<HashSet<String>>,
    /// When set, every send fails
    simulate_failure: AtomicBool,
    /// Number of upcoming sends to fail before succeeding again
    fail_next: AtomicU64,
    /// Total send attempts, including failed ones
    send_count: AtomicU64,
}

impl MockEmailProvider {
    /// Create a new mock provider that accepts everything
    pub fn new() -> Self {
        Self {
            sent_messages: Mutex::new(Vec::new()),
            missing_templates: Mutex::new(HashSet::new()),
            simulate_failure: AtomicBool::new(false),
            fail_next: AtomicU64::new(0),
            send_count: AtomicU64::new(0),
        }
    }

    /// Make every subsequent send fail or succeed
    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `n` sends, then recover
    pub fn fail_next(&self, n: u64) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Treat a template alias as unregistered
    pub fn unregister_template(&self, alias: &str) {
        self.missing_templates
            .lock()
            .unwrap()
            .insert(alias.to_string());
    }

    /// Total send attempts made against the provider
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Messages accepted so far, in send order
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent_messages.lock().unwrap().clone()
    }

    /// Last accepted message addressed to the recipient
    pub fn last_message_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent_messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }

    /// Passcode carried by the last message sent to the recipient
    pub fn last_code_to(&self, to: &str) -> Option<String> {
        self.last_message_to(to)
            .and_then(|m| m.variables.get("VERIFICATION_CODE").cloned())
    }
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn get_template(&self, alias: &str) -> Result<(), String> {
        if self.missing_templates.lock().unwrap().contains(alias) {
            return Err(format!("template '{}' is not registered", alias));
        }
        Ok(())
    }

    async fn send(&self, message: &EmailMessage) -> Result<String, String> {
        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err("simulated provider failure".to_string());
        }
        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err("simulated transient failure".to_string());
        }

        // Console delivery for development; the code is visible here and
        // nowhere else
        if let Some(code) = message.variables.get("VERIFICATION_CODE") {
            println!(
                "[mock email] to={} subject={:?} code={}",
                message.to, message.subject, code
            );
        } else {
            println!("[mock email] to={} subject={:?}", message.to, message.subject);
        }

        info!(
            to = %mask_email(&message.to),
            template = message.template.alias(),
            attempt = attempt,
            "Mock provider accepted message"
        );

        self.sent_messages.lock().unwrap().push(message.clone());
        Ok(format!("mock-{}", uuid::Uuid::new_v4()))
    }
}
