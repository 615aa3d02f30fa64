//! In-memory user store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use otp_core::domain::entities::user::User;
use otp_core::errors::DomainError;
use otp_core::repositories::UserRepository;

/// In-memory user store
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Validation {
                message: "Email already registered".to_string(),
            });
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(&id) {
            Some(user) => {
                user.verify_email();
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: "User".to_string(),
            }),
        }
    }
}
