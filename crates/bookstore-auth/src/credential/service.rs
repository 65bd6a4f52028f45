//! Credential lifecycle: set, change, authenticate with rehash-on-login.

use tracing::{info, warn};

use bookstore_core::config::auth::AuthConfig;
use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;
use bookstore_core::types::UserId;

use crate::credential::store::{CredentialStore, StoredCredential};
use crate::password::hasher::{HashSummary, PasswordHasher};
use crate::password::validator::PasswordValidator;

/// Uniform failure message: an attacker probing the login path must not be
/// able to tell a wrong password from a missing account or a corrupt
/// stored hash.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Orchestrates the credential lifecycle over a [`CredentialStore`].
///
/// The surrounding application calls [`set_password`](Self::set_password)
/// on registration and password change, and
/// [`authenticate`](Self::authenticate) on login. A successful login
/// silently upgrades hashes stored under outdated parameters.
#[derive(Debug, Clone)]
pub struct CredentialService<S> {
    store: S,
    hasher: PasswordHasher,
    validator: PasswordValidator,
}

impl<S: CredentialStore> CredentialService<S> {
    /// Creates a service bound to the configured hasher parameters and
    /// password policy.
    pub fn new(config: &AuthConfig, store: S) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(config),
            validator: PasswordValidator::new(config),
        }
    }

    /// Sets the password for an account, replacing any existing credential.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        self.validator.validate_confirmation(password, confirmation)?;
        self.validator.validate(password)?;
        self.store_fresh_hash(user_id, password).await?;
        info!(%user_id, "credential set");
        Ok(())
    }

    /// Changes the password for an account after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        let stored = self.require_credential(&user_id).await?;
        if !self.hasher.verify(current, &stored.encoded) {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        self.validator.validate_not_same(current, new)?;
        self.validator.validate_confirmation(new, confirmation)?;
        self.validator.validate(new)?;

        self.store_fresh_hash(user_id, new).await?;
        info!(%user_id, "credential changed");
        Ok(())
    }

    /// Authenticates an account by password.
    ///
    /// Unknown accounts, corrupt stored hashes, and wrong passwords all
    /// produce the same authentication error. After a successful
    /// verification, a hash stored under outdated parameters is re-derived
    /// and replaced while the plaintext is still at hand.
    pub async fn authenticate(&self, user_id: UserId, password: &str) -> AppResult<()> {
        let stored = self.require_credential(&user_id).await?;
        if !self.hasher.verify(password, &stored.encoded) {
            warn!(%user_id, "authentication rejected");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        if self.hasher.must_rehash(&stored.encoded) {
            self.store_fresh_hash(user_id, password).await?;
            info!(%user_id, "stored credential upgraded to current parameters");
        }

        Ok(())
    }

    /// Returns the masked diagnostic view of an account's stored hash.
    pub async fn credential_summary(&self, user_id: UserId) -> AppResult<HashSummary> {
        let stored = self
            .store
            .find_by_user(&user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No credential for user {user_id}")))?;
        self.hasher.safe_summary(&stored.encoded)
    }

    /// Encodes `password` under a fresh salt and replaces the stored record.
    async fn store_fresh_hash(&self, user_id: UserId, password: &str) -> AppResult<()> {
        let salt = self.hasher.generate_salt()?;
        let encoded = self.hasher.encode(password, &salt);
        self.store
            .upsert(StoredCredential::new(user_id, encoded))
            .await
    }

    /// Looks up a credential, collapsing absence into the uniform
    /// authentication failure.
    async fn require_credential(&self, user_id: &UserId) -> AppResult<StoredCredential> {
        self.store
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))
    }
}
