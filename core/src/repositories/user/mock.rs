//! Mock implementation of UserRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::trait_::UserRepository;

/// Mock user repository for testing
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a user directly, bypassing duplicate checks
    pub async fn seed(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
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
