//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use clinica_core::auth::{AuthError as CoreError, SessionRecord, SessionToken};

use crate::{AuthError, AuthState};

/// Raw `Authorization: Bearer <token>` value, not validated.
pub struct BearerToken(pub SessionToken);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(SessionToken::new(token)))
            .ok_or_else(|| CoreError::InvalidToken.into())
    }
}

/// Extractor for an authenticated session. Returns 401 if the token is
/// missing, unknown or expired.
///
/// Extracting refreshes the session's last access.
pub struct CurrentSession(pub SessionRecord);

impl CurrentSession {
    /// Fails with `Forbidden` unless the session grants `permission`.
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if self.0.has_permission(permission) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(permission.to_string()).into())
        }
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let auth_state = AuthState::from_ref(state);

        let session = auth_state.manager.validate(&token).await?;
        Ok(CurrentSession(session))
    }
}
