//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// The hasher parameters (iteration count, salt length) live here so that
/// they are bound explicitly at hasher construction instead of hiding in
/// process-global state; test suites substitute a low iteration count for
/// speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Number of SHA-256 rounds applied when encoding a password.
    #[serde(default = "default_iterations")]
    pub password_iterations: u32,
    /// Number of random salt bytes drawn per encoded password.
    #[serde(default = "default_salt_bytes")]
    pub password_salt_bytes: usize,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_iterations: default_iterations(),
            password_salt_bytes: default_salt_bytes(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_iterations() -> u32 {
    100_000
}

fn default_salt_bytes() -> usize {
    12
}

fn default_password_min() -> usize {
    8
}
