//! In-memory OTP record store with optimistic concurrency control

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use otp_core::domain::entities::otp::OtpRecord;
use otp_core::errors::DomainError;
use otp_core::repositories::OtpRepository;

/// In-memory OTP record store
///
/// Keyed by user id, which makes the one-record-per-user invariant
/// structural. Updates are applied only when the caller's version matches
/// the stored one and bump it by one, so a racing read-modify-write always
/// surfaces as [`DomainError::Conflict`] instead of a lost increment.
pub struct InMemoryOtpStore {
    records: RwLock<HashMap<Uuid, OtpRecord>>,
}

impl InMemoryOtpStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live records across all users
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no records are stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpStore {
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

        let user_id = records.values().find(|r| r.id == id).map(|r| r.user_id);
        match user_id {
            Some(user_id) => {
                records.remove(&user_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
