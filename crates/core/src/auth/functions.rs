use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::SessionToken;

/// Length of generated session tokens.
pub const TOKEN_LENGTH: usize = 48;

/// Visible prefix of a token in administrative listings.
const TOKEN_DISPLAY_PREFIX: usize = 8;

/// Generate a session token from the thread-local CSPRNG.
pub fn generate_session_token() -> SessionToken {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    SessionToken::new(token)
}

/// Truncated, non-reversible display form of a token.
pub fn token_display(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_DISPLAY_PREFIX).collect();
    format!("{}…", prefix)
}

/// Canonical form of a login identifier (emails compare case-insensitively).
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Check if a session has been idle for longer than `timeout`.
///
/// Idle for exactly `timeout` is still valid.
pub fn is_session_idle(last_access: DateTime<Utc>, now: DateTime<Utc>, timeout: Duration) -> bool {
    now - last_access > timeout
}
