//! # bookstore-auth
//!
//! Password hashing, password policy enforcement, and credential lifecycle
//! management for the Bookstore platform.
//!
//! ## Modules
//!
//! - `password` — salted, iterated SHA-256 password hashing and policy
//!   enforcement
//! - `credential` — credential storage seam and the lifecycle service
//!   (set, change, authenticate with rehash-on-login)

pub mod credential;
pub mod password;

pub use credential::{CredentialService, CredentialStore, MemoryCredentialStore, StoredCredential};
pub use password::{HashSummary, PasswordHasher, PasswordValidator};
