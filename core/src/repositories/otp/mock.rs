//! Mock implementation of OtpRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::otp::OtpRecord;
use crate::errors::DomainError;

use super::trait_::OtpRepository;

/// Mock OTP repository for testing
///
/// Keyed by user id to mirror the uniqueness invariant, with the same
/// version-checked updates the real store performs.
pub struct MockOtpRepository {
    records: Arc<RwLock<HashMap<Uuid, OtpRecord>>>,
}

impl MockOtpRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record directly, bypassing the conflict check
    pub async fn seed(&self, record: OtpRecord) {
        self.records.write().await.insert(record.user_id, record);
    }

    /// Read the stored record for a user without going through the trait
    pub async fn stored(&self, user_id: Uuid) -> Option<OtpRecord> {
        self.records.read().await.get(&user_id).cloned()
    }
}

impl Default for MockOtpRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRepository for MockOtpRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<OtpRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(&user_id).cloned())
    }

    async fn create(&self, record: OtpRecord) -> Result<OtpRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.user_id) {
            return Err(DomainError::Conflict {
                resource: "OtpRecord".to_string(),
            });
        }

        records.insert(record.user_id, record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: OtpRecord) -> Result<OtpRecord, DomainError> {
        let mut records = self.records.write().await;

        match records.get(&record.user_id) {
            None => Err(DomainError::NotFound {
                resource: "OtpRecord".to_string(),
            }),
            Some(stored) if stored.version != record.version => Err(DomainError::Conflict {
                resource: "OtpRecord".to_string(),
            }),
            Some(_) => {
                record.version += 1;
                records.insert(record.user_id, record.clone());
                Ok(record)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;

        let user_id = records
            .values()
            .find(|r| r.id == id)
            .map(|r| r.user_id);
        match user_id {
            Some(user_id) => {
                records.remove(&user_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
