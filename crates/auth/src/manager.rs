//! Login, validation and revocation of sessions.

use std::sync::Arc;

use serde::Serialize;

use clinica_core::auth::{
    generate_session_token, hash_password, is_session_idle, normalize_identifier,
    verify_password, AuthError as CoreError, Clock, RolePermissions, SessionRecord,
    SessionRepository, SessionSummary, SessionToken, SystemClock, UserDirectory,
};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::throttle::LoginThrottle;

/// What [`SessionManager::purge_expired`] removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub sessions: usize,
    pub attempts: usize,
}

/// Owns the session store and the login throttle.
///
/// Constructed once at startup and shared behind an `Arc`.
pub struct SessionManager {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionRepository>,
    roles: Arc<RolePermissions>,
    throttle: LoginThrottle,
    clock: Arc<dyn Clock>,
    session_timeout: chrono::Duration,
    /// Verified against when the identifier is unknown, so both failure
    /// paths pay for one bcrypt verification.
    dummy_hash: String,
}

impl SessionManager {
    /// # Errors
    ///
    /// Returns `Config` when `max_login_attempts` is zero, or a hashing error
    /// when the configured bcrypt cost is out of range.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionRepository>,
        roles: RolePermissions,
    ) -> Result<Self, AuthError> {
        if config.max_login_attempts == 0 {
            return Err(AuthError::Config(
                "max_login_attempts must be at least 1".to_string(),
            ));
        }

        let dummy_hash = hash_password(
            generate_session_token().as_str(),
            config.password_hash_cost,
        )?;

        Ok(Self {
            users,
            sessions,
            roles: Arc::new(roles),
            throttle: LoginThrottle::new(config.throttle_policy()),
            clock: Arc::new(SystemClock),
            session_timeout: config.session_timeout(),
            dummy_hash,
        })
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn throttle(&self) -> &LoginThrottle {
        &self.throttle
    }

    /// Checks credentials and opens a session.
    ///
    /// A blocked identifier is rejected before the user directory is
    /// consulted. Only bad credentials count towards the block; a disabled
    /// account with the right password does not.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<SessionRecord, AuthError> {
        let identifier = normalize_identifier(identifier);
        let now = self.clock.now();

        if let Err(err) = self.throttle.check(&identifier, now).await {
            tracing::warn!(identifier = %identifier, "Login rejected: identifier is blocked");
            return Err(err.into());
        }

        let user = self.users.find_user_by_identifier(&identifier).await?;
        let hash = user
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |u| u.password_hash.clone());
        let matches = match self.verify(secret, hash).await {
            Ok(matches) => matches,
            // A corrupt stored hash counts as a failed attempt.
            Err(AuthError::Core(CoreError::PasswordHash(reason))) => {
                tracing::error!(
                    identifier = %identifier,
                    error = %reason,
                    "Stored password hash is unreadable"
                );
                false
            }
            Err(err) => return Err(err),
        };

        let user = match user {
            Some(user) if matches => user,
            _ => {
                let count = self.throttle.record_failure(&identifier, now).await;
                tracing::warn!(
                    identifier = %identifier,
                    attempts = count,
                    max_attempts = self.throttle.policy().max_attempts,
                    "Login failed: invalid credentials"
                );
                return Err(CoreError::InvalidCredentials.into());
            }
        };

        if !user.active || !self.users.role_is_active(user.role_id).await? {
            tracing::warn!(
                identifier = %identifier,
                user_id = user.id,
                "Login refused: account or role disabled"
            );
            return Err(CoreError::AccountDisabled.into());
        }

        self.throttle.clear(&identifier).await;

        let now = self.clock.now();
        let record = SessionRecord {
            token: generate_session_token(),
            user_id: user.id,
            full_name: user.full_name,
            email: user.email,
            role_id: user.role_id,
            permissions: self.roles.for_role(&user.role_name),
            role_name: user.role_name,
            created_at: now,
            last_access: now,
        };
        self.sessions.create_session(&record).await?;

        tracing::info!(
            user_id = record.user_id,
            role = %record.role_name,
            token = %record.token.display_form(),
            "Login succeeded"
        );

        Ok(record)
    }

    /// Resolves a token to its session and refreshes its last access.
    ///
    /// A session idle for longer than the timeout is removed and reported as
    /// expired; idle for exactly the timeout is still valid.
    pub async fn validate(&self, token: &SessionToken) -> Result<SessionRecord, AuthError> {
        let now = self.clock.now();

        let session = self
            .sessions
            .get_session(token)
            .await?
            .ok_or(CoreError::InvalidToken)?;

        if is_session_idle(session.last_access, now, self.session_timeout) {
            self.sessions.delete_session(token).await?;
            tracing::debug!(
                user_id = session.user_id,
                token = %token.display_form(),
                "Session expired after inactivity"
            );
            return Err(CoreError::SessionExpired.into());
        }

        // A concurrent logout may remove the session between the two calls.
        let session = self
            .sessions
            .touch_session(token, now)
            .await?
            .ok_or(CoreError::InvalidToken)?;

        Ok(session)
    }

    /// Removes a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.sessions.delete_session(token).await?;
        tracing::info!(token = %token.display_form(), "Logged out");
        Ok(())
    }

    /// Removes every session of `user_id`, returning how many there were.
    pub async fn invalidate_sessions_for_user(&self, user_id: i64) -> Result<usize, AuthError> {
        let revoked = self.sessions.delete_user_sessions(user_id).await?;
        tracing::info!(user_id, revoked, "Revoked user sessions");
        Ok(revoked)
    }

    /// Sessions that are still within the timeout, oldest first, with
    /// truncated tokens.
    pub async fn list_active_sessions(&self) -> Result<Vec<SessionSummary>, AuthError> {
        let now = self.clock.now();

        let mut sessions: Vec<SessionRecord> = self
            .sessions
            .list_sessions()
            .await?
            .into_iter()
            .filter(|s| !is_session_idle(s.last_access, now, self.session_timeout))
            .collect();
        sessions.sort_by_key(|s| s.created_at);

        Ok(sessions.iter().map(SessionRecord::summary).collect())
    }

    /// Drops idle sessions and elapsed attempt records.
    pub async fn purge_expired(&self) -> Result<PurgeReport, AuthError> {
        let now = self.clock.now();

        let report = PurgeReport {
            sessions: self
                .sessions
                .delete_idle_sessions(now, self.session_timeout)
                .await?,
            attempts: self.throttle.purge_elapsed(now).await,
        };

        tracing::debug!(
            sessions = report.sessions,
            attempts = report.attempts,
            "Purged expired session state"
        );

        Ok(report)
    }

    async fn verify(&self, secret: &str, hash: String) -> Result<bool, AuthError> {
        let secret = secret.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&secret, &hash)).await??;
        Ok(matches)
    }
}
