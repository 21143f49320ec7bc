use thiserror::Error;

/// Failures of the login flow and of session lookups.
///
/// `Display` strings are safe to log; they never carry attempt counts or say
/// which half of a credential pair was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("too many failed login attempts, retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account disabled")]
    AccountDisabled,

    #[error("invalid session token")]
    InvalidToken,

    #[error("session expired")]
    SessionExpired,

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),
}
