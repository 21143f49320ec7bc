use super::AuthError;

pub use bcrypt::DEFAULT_COST;

/// Hash a password with a fresh salt at the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password.as_bytes(), cost).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored bcrypt hash.
///
/// A malformed stored hash is an error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password.as_bytes(), hash).map_err(|e| AuthError::PasswordHash(e.to_string()))
}
