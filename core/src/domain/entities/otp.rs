//! One-time passcode record for email-based verification.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the one-time passcode
pub const CODE_LENGTH: usize = 6;

/// How long an issued passcode stays valid (30 minutes)
pub const OTP_VALIDITY_MINUTES: i64 = 30;

/// Length of the rolling issuance window (2 hours)
pub const ATTEMPT_WINDOW_MINUTES: i64 = 120;

/// Maximum passcode issuances allowed within one window
pub const MAX_ATTEMPTS_PER_WINDOW: u32 = 6;

/// Base cooldown between consecutive requests (1 minute, doubled per attempt)
pub const COOLDOWN_UNIT_SECONDS: i64 = 60;

/// One-time passcode record tracking issuance history for a single user
///
/// At most one record exists per user. Re-issuing a passcode mutates the
/// record in place rather than creating a second one, so the attempt counter
/// and window survive across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// User this passcode belongs to
    pub user_id: Uuid,

    /// Bcrypt hash of the current passcode; the plaintext is never stored
    pub code_hash: String,

    /// Timestamp when the current passcode was issued
    pub created_at: DateTime<Utc>,

    /// Timestamp when the current passcode expires
    pub expires_at: DateTime<Utc>,

    /// Number of issuances within the current window
    pub attempts: u32,

    /// Start of the rolling issuance window
    pub attempt_window_start: DateTime<Utc>,

    /// Timestamp of the most recent issuance request
    pub last_request_time: DateTime<Utc>,

    /// Version counter for optimistic concurrency control
    pub version: u64,
}

impl OtpRecord {
    /// Creates a record for a user's first passcode issuance
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user the passcode belongs to
    /// * `code_hash` - Bcrypt hash of the freshly generated passcode
    /// * `now` - The issuance timestamp
    ///
    /// # Returns
    ///
    /// A new `OtpRecord` with one attempt recorded and a fresh window
    pub fn new(user_id: Uuid, code_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            code_hash,
            created_at: now,
            expires_at: now + Duration::minutes(OTP_VALIDITY_MINUTES),
            attempts: 1,
            attempt_window_start: now,
            last_request_time: now,
            version: 0,
        }
    }

    /// Generates a random numeric passcode using the operating system CSPRNG
    ///
    /// Each digit is drawn independently so the code is uniform for any
    /// length.
    ///
    /// # Arguments
    ///
    /// * `length` - Number of digits to generate
    ///
    /// # Returns
    ///
    /// A string of `length` ASCII digits
    pub fn generate_code(length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Checks if the current passcode has expired
    ///
    /// # Returns
    ///
    /// `true` if `now` is past the expiry timestamp, `false` otherwise
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Computes the remaining cooldown before the next issuance is allowed
    ///
    /// The cooldown doubles with every issuance in the window: 1 minute after
    /// the first, 2 after the second, 4 after the third, and so on, measured
    /// from the last request time.
    ///
    /// # Returns
    ///
    /// `Some(remaining)` while the cooldown is still running, `None` once it
    /// has elapsed or no issuance has been recorded yet
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.attempts == 0 {
            return None;
        }
        let cooldown =
            Duration::seconds(COOLDOWN_UNIT_SECONDS * 2i64.pow(self.attempts - 1));
        let elapsed = now - self.last_request_time;
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }

    /// Gets the number of issuances counted against the current window
    ///
    /// # Returns
    ///
    /// The attempt count, or 0 if the window has lapsed
    pub fn attempts_in_window(&self, now: DateTime<Utc>) -> u32 {
        if self.window_elapsed(now) {
            0
        } else {
            self.attempts
        }
    }

    /// Gets the timestamp when the current window lapses and the counter
    /// resets
    pub fn window_resets_at(&self) -> DateTime<Utc> {
        self.attempt_window_start + Duration::minutes(ATTEMPT_WINDOW_MINUTES)
    }

    /// Starts a fresh window at `now` if the current one has lapsed
    pub fn roll_window_if_elapsed(&mut self, now: DateTime<Utc>) {
        if self.window_elapsed(now) {
            self.attempt_window_start = now;
            self.attempts = 0;
        }
    }

    /// Records a new passcode issuance on this record
    ///
    /// Rolls the window first if it has lapsed, then replaces the stored hash
    /// and refreshes the expiry and request timestamps.
    ///
    /// # Arguments
    ///
    /// * `code_hash` - Bcrypt hash of the freshly generated passcode
    /// * `now` - The issuance timestamp
    pub fn record_issuance(&mut self, code_hash: String, now: DateTime<Utc>) {
        self.roll_window_if_elapsed(now);
        self.code_hash = code_hash;
        self.created_at = now;
        self.expires_at = now + Duration::minutes(OTP_VALIDITY_MINUTES);
        self.last_request_time = now;
        self.attempts += 1;
    }

    fn window_elapsed(&self, now: DateTime<Utc>) -> bool {
        now - self.attempt_window_start > Duration::minutes(ATTEMPT_WINDOW_MINUTES)
    }
}
