//! Prototype gallery routes (read-only).

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

/// GET /prototypes/days
pub async fn days(State(state): State<AppState>) -> Result<Json<serde_yaml::Value>, ApiError> {
    Ok(Json(state.prototypes.days().await?))
}

/// GET /prototypes/registry
pub async fn registry(State(state): State<AppState>) -> Result<Json<serde_yaml::Value>, ApiError> {
    Ok(Json(state.prototypes.registry().await?))
}
