//! Vignette routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lifeos_core::vignettes::{NewVignette, Vignette};
use serde::Serialize;

#[derive(Serialize)]
pub struct VignetteList {
    vignettes: Vec<Vignette>,
}

/// GET /vignettes — newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<VignetteList>, ApiError> {
    Ok(Json(VignetteList {
        vignettes: state.vignettes.list().await?,
    }))
}

/// POST /vignettes
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewVignette>,
) -> Result<Json<Vignette>, ApiError> {
    Ok(Json(state.vignettes.create(body).await?))
}

/// GET /vignettes/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vignette>, ApiError> {
    Ok(Json(state.vignettes.get(&id).await?))
}

/// PUT /vignettes/:id — whole-document replace; `created_at` is kept and
/// `updated_at` bumped.
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(vignette): Json<Vignette>,
) -> Result<Json<Vignette>, ApiError> {
    Ok(Json(state.vignettes.save(&id, vignette).await?))
}

/// DELETE /vignettes/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.vignettes.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
