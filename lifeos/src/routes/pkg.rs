//! PKG routes (read-only).

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct PkgList {
    documents: Vec<String>,
}

/// GET /pkg — names of the available profile documents.
pub async fn list(State(state): State<AppState>) -> Result<Json<PkgList>, ApiError> {
    Ok(Json(PkgList {
        documents: state.pkg.list().await?,
    }))
}

/// GET /pkg/:name
pub async fn get_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_yaml::Value>, ApiError> {
    Ok(Json(state.pkg.document(&name).await?))
}
