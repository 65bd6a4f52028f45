//! Salted, iterated SHA-256 password hashing and verification.
//!
//! Encoded hashes are self-describing strings of the form
//! `custom_sha256$<iterations>$<salt>$<base64-digest>`. The tag and
//! iteration count travel in the clear so that hashes produced under older
//! parameters keep verifying and can be upgraded opportunistically after a
//! successful login.
//!
//! The construction (chaining raw SHA-256 digest bytes N times) is not a
//! memory-hard key derivation function. It is preserved as-is because any
//! change to the chaining semantics invalidates every stored credential.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use bookstore_core::config::auth::AuthConfig;
use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;

/// Algorithm tag embedded in every encoded hash. Verification rejects any
/// other tag. Not configurable: changing it orphans all stored hashes.
pub const ALGORITHM: &str = "custom_sha256";

/// Number of leading characters left visible when masking hash fields.
const MASK_SHOW: usize = 6;

/// Masked diagnostic view of an encoded hash, safe for logs and admin
/// screens. Salt and digest are redacted down to a short prefix.
#[derive(Debug, Clone, Serialize)]
pub struct HashSummary {
    /// Algorithm tag, in the clear.
    pub algorithm: String,
    /// Iteration count, in the clear.
    pub iterations: u32,
    /// Masked salt.
    pub salt: String,
    /// Masked digest.
    pub digest: String,
}

/// Encodes plaintext passwords into verifiable salted hashes and verifies
/// plaintext passwords against previously stored hashes.
///
/// Stateless and cheap to clone; every operation is a pure function of its
/// inputs except [`generate_salt`](Self::generate_salt), which draws from
/// the OS entropy source.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Digest rounds applied on encode; verification honors whatever count
    /// is embedded in the stored hash.
    iterations: u32,
    /// Random bytes drawn per salt.
    salt_bytes: usize,
}

impl PasswordHasher {
    /// Creates a new password hasher bound to the configured parameters.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            iterations: config.password_iterations,
            salt_bytes: config.password_salt_bytes,
        }
    }

    /// Generates a fresh base64-encoded random salt.
    ///
    /// Fails loudly if the OS entropy source is unavailable; a predictable
    /// salt would defeat the scheme, so there is no weaker fallback.
    pub fn generate_salt(&self) -> AppResult<String> {
        let mut bytes = vec![0u8; self.salt_bytes];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::internal(format!("Entropy source failure: {e}")))?;
        Ok(BASE64.encode(&bytes))
    }

    /// Encodes a password with the configured iteration count.
    ///
    /// Deterministic for a fixed `(password, salt)` pair; `salt` must come
    /// from [`generate_salt`](Self::generate_salt) and never be reused
    /// across passwords.
    pub fn encode(&self, password: &str, salt: &str) -> String {
        self.encode_with_iterations(password, salt, self.iterations)
    }

    /// Encodes a password with an explicit iteration count.
    ///
    /// Used internally by verification to honor the count embedded in a
    /// stored hash, and by callers re-encoding under legacy parameters.
    pub fn encode_with_iterations(&self, password: &str, salt: &str, iterations: u32) -> String {
        let digest = iterated_digest(password, salt, iterations);
        format!("{ALGORITHM}${iterations}${salt}${digest}")
    }

    /// Verifies a password against a previously encoded hash.
    ///
    /// Malformed input (wrong field count, non-numeric iteration count) and
    /// foreign algorithm tags are rejections, not errors: the caller only
    /// ever sees accepted or rejected. The digest comparison runs in
    /// constant time.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let Some((algorithm, iterations, salt, digest)) = split_encoded(encoded) else {
            return false;
        };
        if algorithm != ALGORITHM {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };

        let computed = iterated_digest(password, salt, iterations);
        constant_time_eq(computed.as_bytes(), digest.as_bytes())
    }

    /// Reports whether a stored hash was produced under parameters that
    /// differ from the configured ones.
    ///
    /// The caller should re-encode and re-store the password right after a
    /// successful verification. A hash whose parameters cannot be read also
    /// reports true: it is due for replacement at the next opportunity.
    pub fn must_rehash(&self, encoded: &str) -> bool {
        match split_encoded(encoded).and_then(|(_, iterations, _, _)| iterations.parse::<u32>().ok())
        {
            Some(iterations) => iterations != self.iterations,
            None => true,
        }
    }

    /// Returns a masked summary of an encoded hash for administrative
    /// display. Diagnostic path, not a security boundary; malformed input
    /// is a validation error here rather than a silent rejection.
    pub fn safe_summary(&self, encoded: &str) -> AppResult<HashSummary> {
        let (algorithm, iterations, salt, digest) = split_encoded(encoded)
            .ok_or_else(|| AppError::validation("Malformed encoded hash"))?;
        let iterations = iterations
            .parse::<u32>()
            .map_err(|_| AppError::validation("Malformed iteration count in encoded hash"))?;

        Ok(HashSummary {
            algorithm: algorithm.to_string(),
            iterations,
            salt: mask_hash(salt),
            digest: mask_hash(digest),
        })
    }
}

/// Applies the iterated digest: round 1 hashes `password ‖ salt`, every
/// later round hashes the previous round's raw digest bytes. The chaining
/// feeds raw bytes, never a textual re-encoding; only the final digest is
/// base64-encoded.
fn iterated_digest(password: &str, salt: &str, iterations: u32) -> String {
    let mut value = Vec::with_capacity(password.len() + salt.len());
    value.extend_from_slice(password.as_bytes());
    value.extend_from_slice(salt.as_bytes());
    for _ in 0..iterations {
        value = Sha256::digest(&value).to_vec();
    }
    BASE64.encode(&value)
}

/// Splits an encoded hash into its four fields on the first three `$`
/// separators. Returns `None` when fewer than four fields are present.
fn split_encoded(encoded: &str) -> Option<(&str, &str, &str, &str)> {
    let mut parts = encoded.splitn(4, '$');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(algorithm), Some(iterations), Some(salt), Some(digest)) => {
            Some((algorithm, iterations, salt, digest))
        }
        _ => None,
    }
}

/// Compares two byte strings in constant time: every byte is examined
/// regardless of where the first mismatch occurs. Length differences are
/// reported immediately; the digest length is not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Masks a hash field for display: the first [`MASK_SHOW`] characters stay
/// visible, the remainder is replaced with `*`.
fn mask_hash(value: &str) -> String {
    let shown: String = value.chars().take(MASK_SHOW).collect();
    let hidden = value.chars().count().saturating_sub(MASK_SHOW);
    format!("{shown}{}", "*".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Hasher with a low iteration count so tests stay fast.
    fn test_hasher(iterations: u32) -> PasswordHasher {
        let config = AuthConfig {
            password_iterations: iterations,
            ..AuthConfig::default()
        };
        PasswordHasher::new(&config)
    }

    #[test]
    fn test_golden_vector() {
        // Catches algorithm drift, e.g. chaining hex strings instead of
        // raw digest bytes between rounds.
        let hasher = test_hasher(10);
        assert_eq!(
            hasher.encode_with_iterations("hunter2", "c2FsdHNhbHQ=", 2),
            "custom_sha256$2$c2FsdHNhbHQ=$uBt4Rtd8T+5aEN+Ufyd/kPf9MrdnhneO8yoOzABYA3s="
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let hasher = test_hasher(50);
        let salt = hasher.generate_salt().unwrap();
        assert_eq!(
            hasher.encode("correct horse", &salt),
            hasher.encode("correct horse", &salt)
        );
    }

    #[test]
    fn test_round_trip() {
        let hasher = test_hasher(50);
        let salt = hasher.generate_salt().unwrap();
        let encoded = hasher.encode("battery staple", &salt);
        assert!(hasher.verify("battery staple", &encoded));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hasher = test_hasher(50);
        let salt = hasher.generate_salt().unwrap();
        let encoded = hasher.encode("battery staple", &salt);
        assert!(!hasher.verify("battery stable", &encoded));
        assert!(!hasher.verify("", &encoded));
    }

    #[test]
    fn test_salts_are_unique_and_sized() {
        let hasher = test_hasher(1);
        let salts: HashSet<String> = (0..1_000)
            .map(|_| hasher.generate_salt().unwrap())
            .collect();
        assert_eq!(salts.len(), 1_000);
        for salt in &salts {
            assert_eq!(BASE64.decode(salt).unwrap().len(), 12);
        }
    }

    #[test]
    fn test_verify_honors_embedded_iteration_count() {
        // A hash produced under legacy parameters still verifies.
        let hasher = test_hasher(100);
        let encoded = hasher.encode_with_iterations("pw", "c2FsdHNhbHQ=", 7);
        assert!(hasher.verify("pw", &encoded));
    }

    #[test]
    fn test_tampering_with_any_character_rejects() {
        let hasher = test_hasher(10);
        let encoded = hasher.encode("battery staple", "c2FsdHNhbHQ=");
        // Flip every character in the salt and digest portions in turn.
        let secret_start = ALGORITHM.len() + "$10$".len();
        for i in secret_start..encoded.len() {
            let original = encoded.as_bytes()[i];
            if original == b'$' {
                continue;
            }
            let flipped = if original == b'A' { b'B' } else { b'A' };
            let mut tampered = encoded.clone().into_bytes();
            tampered[i] = flipped;
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(
                !hasher.verify("battery staple", &tampered),
                "tampered position {i} was accepted"
            );
        }
    }

    #[test]
    fn test_malformed_input_is_rejection_not_error() {
        let hasher = test_hasher(10);
        assert!(!hasher.verify("anything", "garbage"));
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "custom_sha256$abc"));
        assert!(!hasher.verify("anything", "custom_sha256$not-a-number$abc$def"));
    }

    #[test]
    fn test_foreign_algorithm_tag_rejected() {
        let hasher = test_hasher(10);
        assert!(!hasher.verify("anything", "wrongtag$100000$abc$def"));
    }

    #[test]
    fn test_must_rehash_on_parameter_change() {
        let hasher = test_hasher(100);
        let legacy = hasher.encode_with_iterations("pw", "c2FsdHNhbHQ=", 50);
        let current = hasher.encode("pw", "c2FsdHNhbHQ=");
        assert!(hasher.must_rehash(&legacy));
        assert!(!hasher.must_rehash(&current));
        assert!(hasher.must_rehash("garbage"));
    }

    #[test]
    fn test_safe_summary_masks_secret_material() {
        let hasher = test_hasher(10);
        let salt = hasher.generate_salt().unwrap();
        let encoded = hasher.encode("battery staple", &salt);
        let digest = encoded.rsplit('$').next().unwrap().to_string();

        let summary = hasher.safe_summary(&encoded).unwrap();
        assert_eq!(summary.algorithm, ALGORITHM);
        assert_eq!(summary.iterations, 10);
        assert!(!summary.salt.contains(&salt));
        assert!(!summary.digest.contains(&digest));
        assert!(summary.salt.ends_with('*'));
        assert!(summary.digest.ends_with('*'));
    }

    #[test]
    fn test_safe_summary_serializes() {
        let hasher = test_hasher(10);
        let encoded = hasher.encode("battery staple", "c2FsdHNhbHQ=");
        let value = serde_json::to_value(hasher.safe_summary(&encoded).unwrap()).unwrap();
        assert_eq!(value["algorithm"], "custom_sha256");
        assert_eq!(value["iterations"], 10);
        assert!(value["digest"].as_str().unwrap().contains('*'));
    }

    #[test]
    fn test_safe_summary_rejects_malformed_input() {
        let hasher = test_hasher(10);
        assert!(hasher.safe_summary("garbage").is_err());
        assert!(hasher.safe_summary("custom_sha256$NaN$abc$def").is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
