// crates/domain/src/security/password.rs

//! Argon2 credential hashing for the admin user list.
//!
//! Hashes are PHC strings (`$argon2id$...`), produced once by the
//! `hash-password` command and verified on every login. Nothing here is
//! reversible.

use argon2::{Argon2, PasswordHasher};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString};
use thiserror::Error;

const MIN_PASSWORD_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    Weak,
    #[error(transparent)]
    Hash(#[from] password_hash::Error),
}

/// Hash a password for storage in the user file.
///
/// Enforces the minimum-length policy before hashing; a weak password
/// never produces a hash.
pub fn hash_password(pw: &str) -> Result<String, PasswordError> {
    if pw.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::Weak);
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(pw.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a login attempt against a stored PHC hash.
///
/// `Ok(false)` means the password did not match; `Err` means the stored
/// hash itself is unusable.
pub fn verify_password(pw: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(pw.as_bytes(), &parsed)
        .is_ok())
}
