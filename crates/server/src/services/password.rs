//! Password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Minimum customer password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum admin password length.
pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 6;

/// Hashing or verification failed for a reason other than a wrong password.
#[derive(Debug, thiserror::Error)]
#[error("password hash error: {0}")]
pub struct PasswordError(argon2::password_hash::Error);

/// Hash a password with argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// A wrong password is `Ok(false)`; only a malformed stored hash is an
/// error.
///
/// # Errors
///
/// Returns `PasswordError` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
