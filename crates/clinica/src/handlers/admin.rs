//! Cache administration endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use clinica_auth::CurrentSession;
use clinica_core::auth::permission;
use clinica_core::cache::CacheStats;

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct CacheReport {
    /// Stored entries, including expired ones not yet read.
    pub entries: usize,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub group: String,
    pub removed: usize,
}

/// GET /api/admin/cache
pub async fn cache_stats(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<CacheReport>, AppError> {
    current.require(permission::CONFIGURACION)?;
    let stats = state.cache.stats();
    Ok(Json(CacheReport {
        entries: state.memory.len().await,
        stats,
        hit_ratio: stats.hit_ratio(),
    }))
}

/// DELETE /api/admin/cache
pub async fn clear_cache(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<StatusCode, AppError> {
    current.require(permission::CONFIGURACION)?;
    state.cache.clear_all().await;
    tracing::info!(user_id = current.0.user_id, "Cache cleared by administrator");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/cache/{group}
pub async fn invalidate_cache_group(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(group): Path<String>,
) -> Result<Json<InvalidateResponse>, AppError> {
    current.require(permission::CONFIGURACION)?;
    let removed = state.cache.invalidate_group(&group).await;
    Ok(Json(InvalidateResponse { group, removed }))
}
