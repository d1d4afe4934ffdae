//! World singleton routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use lifeos_core::versions::WorldFiles;
use lifeos_core::world::{SettingPatch, WorldMeta, WorldSetting, WorldThesis};

/// GET /world — the full live aggregate.
pub async fn aggregate(State(state): State<AppState>) -> Result<Json<WorldFiles>, ApiError> {
    Ok(Json(state.versions.capture().await?))
}

/// GET /world/meta
pub async fn get_meta(State(state): State<AppState>) -> Result<Json<WorldMeta>, ApiError> {
    Ok(Json(state.world.meta().await?))
}

/// PUT /world/meta
pub async fn put_meta(
    State(state): State<AppState>,
    Json(meta): Json<WorldMeta>,
) -> Result<Json<WorldMeta>, ApiError> {
    state.world.save_meta(&meta).await?;
    Ok(Json(meta))
}

/// GET /world/setting
pub async fn get_setting(State(state): State<AppState>) -> Result<Json<WorldSetting>, ApiError> {
    Ok(Json(state.world.setting().await?))
}

/// PUT /world/setting — partial-field merge.
pub async fn put_setting(
    State(state): State<AppState>,
    Json(patch): Json<SettingPatch>,
) -> Result<Json<WorldSetting>, ApiError> {
    Ok(Json(state.world.update_setting(patch).await?))
}

/// GET /world/thesis
pub async fn get_thesis(State(state): State<AppState>) -> Result<Json<WorldThesis>, ApiError> {
    Ok(Json(state.world.thesis().await?))
}

/// PUT /world/thesis
pub async fn put_thesis(
    State(state): State<AppState>,
    Json(thesis): Json<WorldThesis>,
) -> Result<Json<WorldThesis>, ApiError> {
    state.world.save_thesis(&thesis).await?;
    Ok(Json(thesis))
}
