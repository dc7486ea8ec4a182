use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::AppError;

/// Hash a plaintext password into an argon2 PHC string with a fresh
/// random salt. The plaintext is never stored.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(AppError::PasswordHash)?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored PHC string. An
/// unparseable hash counts as a mismatch rather than an error, so a
/// corrupt row can never authenticate.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
