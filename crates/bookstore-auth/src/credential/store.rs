//! Credential persistence seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use bookstore_core::result::AppResult;
use bookstore_core::types::UserId;

/// A stored credential record: the encoded hash for one account.
///
/// Records are replaced wholesale on password change or rehash, never
/// mutated field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Account the credential belongs to.
    pub user_id: UserId,
    /// The self-describing encoded hash string.
    pub encoded: String,
    /// When the credential was last set or upgraded.
    pub updated_at: DateTime<Utc>,
}

impl StoredCredential {
    /// Creates a record stamped with the current time.
    pub fn new(user_id: UserId, encoded: String) -> Self {
        Self {
            user_id,
            encoded,
            updated_at: Utc::now(),
        }
    }
}

/// Persistence seam for credential records, keyed by account identity.
///
/// Implementations must be internally synchronized; the service accesses
/// them from arbitrarily many tasks.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find the credential for an account.
    async fn find_by_user(&self, user_id: &UserId) -> AppResult<Option<StoredCredential>>;

    /// Insert or replace the credential for an account.
    async fn upsert(&self, credential: StoredCredential) -> AppResult<()>;

    /// Delete the credential for an account. Returns `true` if deleted.
    async fn delete(&self, user_id: &UserId) -> AppResult<bool>;
}

/// In-memory credential store backed by a concurrent map.
///
/// Used by the test suite and by embedded deployments that keep accounts
/// in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<DashMap<UserId, StoredCredential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_user(&self, user_id: &UserId) -> AppResult<Option<StoredCredential>> {
        Ok(self.entries.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, credential: StoredCredential) -> AppResult<()> {
        self.entries.insert(credential.user_id, credential);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AppResult<bool> {
        Ok(self.entries.remove(user_id).is_some())
    }
}
