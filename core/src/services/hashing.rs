//! Passcode hashing using bcrypt.
//!
//! Passcodes are stored only as bcrypt hashes. Verification re-hashes the
//! candidate against the stored salt, so the plaintext never needs to be
//! retained after dispatch.

use crate::errors::{DomainError, DomainResult};

/// Default bcrypt cost factor for hashing passcodes
pub const DEFAULT_HASH_COST: u32 = 11;

/// Hashes passcodes at rest and verifies candidates against stored hashes
#[derive(Debug, Clone)]
pub struct CodeHasher {
    cost: u32,
}

impl CodeHasher {
    /// Creates a hasher with a specific bcrypt cost factor
    ///
    /// Tests use a low cost to stay fast; production uses
    /// [`DEFAULT_HASH_COST`].
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes a plaintext passcode
    pub fn hash(&self, code: &str) -> DomainResult<String> {
        bcrypt::hash(code, self.cost).map_err(|e| DomainError::Internal {
            message: format!("Failed to hash passcode: {}", e),
        })
    }

    /// Checks a candidate passcode against a stored hash
    pub fn verify(&self, code: &str, code_hash: &str) -> DomainResult<bool> {
        bcrypt::verify(code, code_hash).map_err(|e| DomainError::Internal {
            message: format!("Failed to verify passcode: {}", e),
        })
    }
}

impl Default for CodeHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}
