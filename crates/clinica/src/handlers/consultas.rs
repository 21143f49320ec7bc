//! Consulta CRUD handlers.
//!
//! These handlers use the cached repository from `AppState`; cache
//! invalidation happens inside the decorator.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use clinica_auth::CurrentSession;
use clinica_core::auth::permission;
use clinica_core::storage::{Consulta, NewConsulta, RepositoryError};

use crate::{handlers::AppError, state::AppState};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

/// Query parameters for listing consultas.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of consultas to return (default: 50, capped at 500)
    pub limit: Option<usize>,
}

impl ListQuery {
    fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Query parameters for the daily listing.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    /// Day to list (ISO 8601: YYYY-MM-DD, default: today in UTC)
    pub fecha: Option<NaiveDate>,
}

/// GET /api/consultas
pub async fn list_consultas(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Consulta>>, AppError> {
    current.require(permission::CONSULTAS)?;
    let consultas = state.consultas.list_recent(query.effective_limit()).await?;
    Ok(Json(consultas))
}

/// GET /api/consultas/hoy
pub async fn list_consultas_hoy(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<Consulta>>, AppError> {
    current.require(permission::CONSULTAS)?;
    let day = query.fecha.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(state.consultas.list_on(day).await?))
}

/// GET /api/consultas/{id}
pub async fn get_consulta(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<Consulta>, AppError> {
    current.require(permission::CONSULTAS)?;
    let consulta = state
        .consultas
        .get(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            entity_type: "Consulta",
            id: id.to_string(),
        })?;
    Ok(Json(consulta))
}

/// POST /api/consultas
pub async fn create_consulta(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<NewConsulta>,
) -> Result<(StatusCode, Json<Consulta>), AppError> {
    current.require(permission::CONSULTAS)?;
    let consulta = state.consultas.create(payload).await?;
    tracing::info!(id = consulta.id, user_id = current.0.user_id, "Created consulta");
    Ok((StatusCode::CREATED, Json(consulta)))
}

/// PUT /api/consultas/{id}
pub async fn update_consulta(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
    Json(payload): Json<NewConsulta>,
) -> Result<Json<Consulta>, AppError> {
    current.require(permission::CONSULTAS)?;
    let consulta = state.consultas.update(id, payload).await?;
    tracing::info!(id, user_id = current.0.user_id, "Updated consulta");
    Ok(Json(consulta))
}

/// DELETE /api/consultas/{id}
pub async fn delete_consulta(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    current.require(permission::CONSULTAS)?;
    state.consultas.delete(id).await?;
    tracing::info!(id, user_id = current.0.user_id, "Deleted consulta");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_caps() {
        assert_eq!(ListQuery { limit: None }.effective_limit(), 50);
        assert_eq!(ListQuery { limit: Some(10) }.effective_limit(), 10);
        assert_eq!(ListQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(ListQuery { limit: Some(10_000) }.effective_limit(), 500);
    }
}
