//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use clinica_core::auth::{is_session_idle, Result, SessionRecord, SessionRepository, SessionToken};

/// In-memory session store.
///
/// Stores sessions in a HashMap wrapped in `Arc<RwLock<_>>`. Data is not
/// persisted and will be lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create_session(&self, session: &SessionRecord) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token.as_str()).cloned())
    }

    async fn touch_session(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(token.as_str()).map(|session| {
            session.last_access = now;
            session.clone()
        }))
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token.as_str());
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: i64) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(before - sessions.len())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().cloned().collect())
    }

    async fn delete_idle_sessions(&self, now: DateTime<Utc>, timeout: Duration) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !is_session_idle(s.last_access, now, timeout));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_core::auth::Permissions;

    fn session(token: &str, user_id: i64) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            token: SessionToken::new(token),
            user_id,
            full_name: "Ana Torres".to_string(),
            email: "ana@clinica.test".to_string(),
            role_id: 2,
            role_name: "medico".to_string(),
            permissions: Permissions::new(),
            created_at: now,
            last_access: now,
        }
    }

    #[tokio::test]
    async fn test_session_create_and_get() {
        let store = SessionStore::new();
        let record = session("token-1", 123);

        store.create_session(&record).await.unwrap();

        let retrieved = store
            .get_session(&SessionToken::new("token-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.token.as_str(), "token-1");
        assert_eq!(retrieved.user_id, 123);
    }

    #[tokio::test]
    async fn test_touch_updates_last_access() {
        let store = SessionStore::new();
        let record = session("token-1", 123);
        store.create_session(&record).await.unwrap();

        let later = record.last_access + Duration::minutes(10);
        let touched = store
            .touch_session(&SessionToken::new("token-1"), later)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(touched.last_access, later);
        assert_eq!(touched.created_at, record.created_at);

        let stored = store
            .get_session(&SessionToken::new("token-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_access, later);
    }

    #[tokio::test]
    async fn test_session_delete() {
        let store = SessionStore::new();
        let record = session("token-1", 123);

        store.create_session(&record).await.unwrap();
        store
            .delete_session(&SessionToken::new("token-1"))
            .await
            .unwrap();

        let retrieved = store
            .get_session(&SessionToken::new("token-1"))
            .await
            .unwrap();
        assert!(retrieved.is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_is_absent_everywhere() {
        let store = SessionStore::new();
        let unknown = SessionToken::new("nonexistent");

        assert!(store.get_session(&unknown).await.unwrap().is_none());
        assert!(store
            .touch_session(&unknown, Utc::now())
            .await
            .unwrap()
            .is_none());
        // Deleting an unknown session is not an error
        store.delete_session(&unknown).await.unwrap();
        assert_eq!(store.delete_user_sessions(999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_user_sessions() {
        let store = SessionStore::new();

        for (token, user_id) in [("token-1", 123), ("token-2", 123), ("token-3", 456)] {
            store.create_session(&session(token, user_id)).await.unwrap();
        }

        let removed = store.delete_user_sessions(123).await.unwrap();
        assert_eq!(removed, 2);

        assert!(store
            .get_session(&SessionToken::new("token-1"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .get_session(&SessionToken::new("token-2"))
            .await
            .unwrap()
            .is_none());

        // Other users keep their sessions
        assert!(store
            .get_session(&SessionToken::new("token-3"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_idle_sessions() {
        let store = SessionStore::new();
        let timeout = Duration::minutes(30);

        let idle = session("idle", 1);
        let mut fresh = session("fresh", 2);
        fresh.last_access = idle.last_access + Duration::minutes(20);

        store.create_session(&idle).await.unwrap();
        store.create_session(&fresh).await.unwrap();

        let now = idle.last_access + timeout + Duration::seconds(1);
        let removed = store.delete_idle_sessions(now, timeout).await.unwrap();

        assert_eq!(removed, 1);
        let remaining = store.list_sessions().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token.as_str(), "fresh");
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = SessionStore::new();
        let clone = store.clone();

        store
            .create_session(&session("token-1", 123))
            .await
            .unwrap();

        let retrieved = clone
            .get_session(&SessionToken::new("token-1"))
            .await
            .unwrap();
        assert!(retrieved.is_some());
    }
}
