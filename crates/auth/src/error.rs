use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the clinica_auth crate.
///
/// This wraps the core `AuthError` and adds the failures of the shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (credentials, tokens, storage).
    #[error(transparent)]
    Core(#[from] clinica_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking task (password verification) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Task(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use clinica_core::auth::AuthError as CoreError;

        match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::RateLimited { retry_after_secs } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(RETRY_AFTER, retry_after_secs.to_string())],
                    self.to_string(),
                )
                    .into_response(),
                // Disabled accounts are indistinguishable from bad credentials.
                CoreError::InvalidCredentials | CoreError::AccountDisabled => (
                    StatusCode::UNAUTHORIZED,
                    CoreError::InvalidCredentials.to_string(),
                )
                    .into_response(),
                CoreError::InvalidToken | CoreError::SessionExpired => {
                    (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
                }
                CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
                CoreError::Storage(_) | CoreError::PasswordHash(_) => internal_error(&self),
            },
            AuthError::Config(_) | AuthError::Task(_) => internal_error(&self),
        }
    }
}

fn internal_error(err: &AuthError) -> Response {
    tracing::error!("Auth error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
        .into_response()
}
