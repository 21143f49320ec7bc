use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{AuthError, SessionRecord, SessionToken, UserAccount};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Lookup of accounts and roles used by the login flow.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by its normalized login identifier (email).
    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>>;

    /// Whether the role is enabled. Unknown roles are inactive.
    async fn role_is_active(&self, role_id: i64) -> Result<bool>;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create_session(&self, session: &SessionRecord) -> Result<()>;

    /// Retrieve session by token.
    async fn get_session(&self, token: &SessionToken) -> Result<Option<SessionRecord>>;

    /// Set `last_access = now` and return the updated record, if present.
    async fn touch_session(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>>;

    /// Delete a specific session. Absent tokens are not an error.
    async fn delete_session(&self, token: &SessionToken) -> Result<()>;

    /// Delete all sessions for a user, returning how many were removed.
    async fn delete_user_sessions(&self, user_id: i64) -> Result<usize>;

    /// All stored sessions, in no particular order.
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>>;

    /// Delete every session idle for longer than `timeout` at `now`.
    async fn delete_idle_sessions(&self, now: DateTime<Utc>, timeout: Duration) -> Result<usize>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
