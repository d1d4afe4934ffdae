//! Version snapshot routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lifeos_core::versions::{Snapshot, SnapshotMeta};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct VersionList {
    versions: Vec<SnapshotMeta>,
}

/// GET /world/versions — metadata only, newest first. An empty history is
/// `{"versions": []}`, not an error.
pub async fn list(State(state): State<AppState>) -> Result<Json<VersionList>, ApiError> {
    Ok(Json(VersionList {
        versions: state.versions.list().await?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateVersion {
    pub version: String,
    #[serde(default)]
    pub notes: String,
}

/// POST /world/versions — snapshot the live aggregate. A duplicate
/// version string is a conflict, never an overwrite.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateVersion>,
) -> Result<Json<SnapshotMeta>, ApiError> {
    Ok(Json(state.versions.create(&body.version, &body.notes).await?))
}

/// GET /world/versions/:version — the full snapshot, payload included.
pub async fn get_one(
    State(state): State<AppState>,
    Path(version): Path<String>,
) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.versions.get(&version).await?))
}

/// POST /world/versions/:version/restore — write the snapshot's payload
/// back over the live aggregate (safety snapshot first, staged commit).
pub async fn restore(
    State(state): State<AppState>,
    Path(version): Path<String>,
) -> Result<Json<SnapshotMeta>, ApiError> {
    Ok(Json(state.versions.restore(&version).await?))
}
