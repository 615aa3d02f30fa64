//! User entity representing a registered account in the MailGate system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Email address passcodes are delivered to
    pub email: String,

    /// Display name used in email greetings
    pub name: String,

    /// Whether the email address has been verified with a passcode
    pub is_email_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance with an unverified email address
    pub fn new(email: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the user's email address as verified
    pub fn verify_email(&mut self) {
        self.is_email_verified = true;
        self.updated_at = Utc::now();
    }
}
