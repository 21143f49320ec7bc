use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token_display;

/// Permission name → granted flag, as configured for a role.
pub type Permissions = BTreeMap<String, bool>;

/// Opaque, unguessable session token.
///
/// `Debug` prints only the truncated display form so tokens do not end up
/// in logs by accident.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for administrative listings.
    pub fn display_form(&self) -> String {
        token_display(&self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&self.display_form())
            .finish()
    }
}

/// A user as stored by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    /// bcrypt hash of the user's password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i64,
    pub role_name: String,
    pub active: bool,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: SessionToken,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub role_name: String,
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl SessionRecord {
    /// Returns true when `permission` is present and granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.get(permission).copied().unwrap_or(false)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            token: self.token.display_form(),
            user_id: self.user_id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role_name: self.role_name.clone(),
            created_at: self.created_at,
            last_access: self.last_access,
        }
    }
}

/// Administrative view of a session; never carries the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub token: String,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}
