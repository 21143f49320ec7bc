//! HTTP handlers for login, logout and session administration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinica_core::auth::{permission, Permissions, SessionRecord, SessionSummary};

use crate::{
    error::AuthError,
    extractors::{BearerToken, CurrentSession},
    manager::PurgeReport,
    state::AuthState,
};

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The caller's own session, without the token.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub role_name: String,
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            full_name: record.full_name,
            email: record.email,
            role_id: record.role_id,
            role_name: record.role_name,
            permissions: record.permissions,
            created_at: record.created_at,
            last_access: record.last_access,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

/// Create the auth router.
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/auth/sessions", get(list_sessions))
        .route("/auth/sessions/purge", post(purge_sessions))
        .route("/auth/users/{user_id}/sessions", delete(revoke_user_sessions))
}

async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let session = state
        .manager
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token.as_str().to_string(),
        session: session.into(),
    }))
}

async fn logout(
    State(state): State<AuthState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AuthError> {
    state.manager.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn current_session(CurrentSession(session): CurrentSession) -> Json<SessionView> {
    Json(session.into())
}

async fn list_sessions(
    State(state): State<AuthState>,
    current: CurrentSession,
) -> Result<Json<Vec<SessionSummary>>, AuthError> {
    current.require(permission::USUARIOS)?;
    Ok(Json(state.manager.list_active_sessions().await?))
}

async fn revoke_user_sessions(
    State(state): State<AuthState>,
    current: CurrentSession,
    Path(user_id): Path<i64>,
) -> Result<Json<RevokeResponse>, AuthError> {
    current.require(permission::USUARIOS)?;
    let revoked = state.manager.invalidate_sessions_for_user(user_id).await?;
    Ok(Json(RevokeResponse { revoked }))
}

async fn purge_sessions(
    State(state): State<AuthState>,
    current: CurrentSession,
) -> Result<Json<PurgeReport>, AuthError> {
    current.require(permission::USUARIOS)?;
    Ok(Json(state.manager.purge_expired().await?))
}
