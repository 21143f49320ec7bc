//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::manager::SessionManager;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub manager: Arc<SessionManager>,
}

impl AuthState {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
