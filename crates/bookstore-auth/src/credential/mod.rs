//! Credential storage seam and lifecycle service.

pub mod service;
pub mod store;

pub use service::CredentialService;
pub use store::{CredentialStore, MemoryCredentialStore, StoredCredential};
