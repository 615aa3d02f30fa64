//! OTP record repository trait with optimistic concurrency control.
//!
//! The store holds at most one record per user and guards every update with
//! the record's version token. Issuance and verification for the same user
//! are serialized through these two invariants; the service layer resolves
//! conflicts by re-reading and retrying.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::otp::OtpRecord;
use crate::errors::DomainError;

/// Repository trait for OTP record persistence operations
///
/// Implementations must enforce two invariants:
///
/// * **Uniqueness**: at most one record exists per `user_id`; `create`
///   fails with [`DomainError::Conflict`] when one already does.
/// * **Versioned updates**: `update` applies only when the given record's
///   `version` matches the stored one, bumps the stored version, and fails
///   with [`DomainError::Conflict`] otherwise. Concurrent read-modify-write
///   sequences can therefore never silently lose an increment.
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Find the live record for a user
    ///
    /// # Arguments
    /// * `user_id` - The UUID of the owning user
    ///
    /// # Returns
    /// * `Ok(Some(OtpRecord))` - A record exists for the user
    /// * `Ok(None)` - No record stored
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<OtpRecord>, DomainError>;

    /// Create the first record for a user
    ///
    /// # Arguments
    /// * `record` - The record to persist, version 0
    ///
    /// # Returns
    /// * `Ok(OtpRecord)` - The stored record
    /// * `Err(DomainError::Conflict)` - A record already exists for the user
    /// * `Err(DomainError)` - Storage error occurred
    async fn create(&self, record: OtpRecord) -> Result<OtpRecord, DomainError>;

    /// Conditionally update a user's record
    ///
    /// # Arguments
    /// * `record` - The mutated record carrying the version it was read at
    ///
    /// # Returns
    /// * `Ok(OtpRecord)` - The stored record with its version bumped
    /// * `Err(DomainError::Conflict)` - The stored version moved on; re-read
    ///   and retry
    /// * `Err(DomainError::NotFound)` - The record was deleted concurrently
    /// * `Err(DomainError)` - Storage error occurred
    async fn update(&self, record: OtpRecord) -> Result<OtpRecord, DomainError>;

    /// Delete a record by its identity
    ///
    /// # Arguments
    /// * `id` - The UUID of the record (not the user)
    ///
    /// # Returns
    /// * `Ok(true)` - Record was deleted
    /// * `Ok(false)` - No record with that id existed
    /// * `Err(DomainError)` - Storage error occurred
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
