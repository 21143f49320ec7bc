use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clinica_auth::AuthError;
use clinica_core::storage::{repository_error_to_status_code, RepositoryError};

/// Handler error. Auth failures keep their own response; repository errors
/// map to their status code; anything else is a logged 500.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self.0.downcast::<AuthError>() {
            Ok(auth_error) => return auth_error.into_response(),
            Err(err) => err,
        };

        let status_code = err
            .downcast_ref::<RepositoryError>()
            .map(repository_error_to_status_code)
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %err, "Request failed");
            return (status_code, "Internal server error").into_response();
        }

        (status_code, err.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
