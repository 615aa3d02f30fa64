//! User repository trait defining the interface for user data persistence.
//!
//! User storage is an external collaborator of the OTP core. Only the
//! operations the passcode workflow needs are part of the contract.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Implementations handle the actual storage while keeping the domain layer
/// free of infrastructure concerns. Lookups by email expect the address
/// already normalized (trimmed, lowercased).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their normalized email address
    ///
    /// # Arguments
    /// * `email` - Normalized email address
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user registered under the address
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    ///
    /// # Arguments
    /// * `id` - The UUID of the user
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user found with given ID
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Create a new user in the repository
    ///
    /// # Arguments
    /// * `user` - The User entity to persist
    ///
    /// # Returns
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError)` - Creation failed (e.g. duplicate email)
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Mark a user's email address as verified
    ///
    /// Called by the verification flow after a passcode match.
    ///
    /// # Arguments
    /// * `id` - The UUID of the user
    ///
    /// # Returns
    /// * `Ok(())` - Verification flag persisted
    /// * `Err(DomainError)` - User missing or storage error
    async fn mark_email_verified(&self, id: Uuid) -> Result<(), DomainError>;
}
