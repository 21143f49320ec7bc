//! In-memory user directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clinica_core::auth::{normalize_identifier, Result, UserAccount, UserDirectory};

/// Users keyed by normalized email, plus the enabled flag of each role.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, UserAccount>>>,
    roles: Arc<RwLock<HashMap<i64, bool>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user. Its role is registered as active unless the
    /// role is already known.
    pub async fn insert_user(&self, user: UserAccount) {
        self.roles.write().await.entry(user.role_id).or_insert(true);
        self.users
            .write()
            .await
            .insert(normalize_identifier(&user.email), user);
    }

    pub async fn set_role_active(&self, role_id: i64, active: bool) {
        self.roles.write().await.insert(role_id, active);
    }

    pub async fn set_user_active(&self, identifier: &str, active: bool) {
        if let Some(user) = self
            .users
            .write()
            .await
            .get_mut(&normalize_identifier(identifier))
        {
            user.active = active;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<UserAccount>> {
        let users = self.users.read().await;
        Ok(users.get(&normalize_identifier(identifier)).cloned())
    }

    async fn role_is_active(&self, role_id: i64) -> Result<bool> {
        let roles = self.roles.read().await;
        Ok(roles.get(&role_id).copied().unwrap_or(false))
    }
}
