//! One-way salted hashing for passwords and refresh tokens at rest

use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

use crate::error::{AuthError, AuthResult};

/// Hash a secret with Argon2 and a fresh random salt
pub fn hash_secret(secret: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Failed to hash secret: {}", e)))
}

/// Check a candidate against a stored hash
pub fn verify_secret(hash: &str, candidate: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Failed to parse stored hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok())
}

static DECOY: OnceLock<Option<String>> = OnceLock::new();

fn decoy_hash() -> Option<&'static str> {
    DECOY
        .get_or_init(|| hash_secret("decoy-secret-never-issued").ok())
        .as_deref()
}

/// Pay for a full verification when there is no stored hash to check against
pub fn verify_decoy(candidate: &str) {
    if let Some(hash) = decoy_hash() {
        let _ = verify_secret(hash, candidate);
    }
}

#[cfg(test)]
pub(crate) fn decoy_prepared() -> bool {
    matches!(DECOY.get(), Some(Some(_)))
}
