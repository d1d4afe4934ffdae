//! Finding-session routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lifeos_core::findings::{FindingSession, FindingSummary, NewFinding};
use serde::Deserialize;

#[derive(serde::Serialize)]
pub struct FindingList {
    sessions: Vec<FindingSummary>,
}

/// GET /findings — session summaries, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<FindingList>, ApiError> {
    Ok(Json(FindingList {
        sessions: state.findings.list().await?,
    }))
}

/// POST /findings — start a session record.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewFinding>,
) -> Result<Json<FindingSession>, ApiError> {
    if body.vignette_id.is_empty() {
        return Err(ApiError::invalid("vignette_id is required"));
    }
    Ok(Json(state.findings.create(body).await?))
}

/// GET /findings/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FindingSession>, ApiError> {
    Ok(Json(state.findings.get(&id).await?))
}

/// PATCH /findings/:id — append exactly one reaction.
pub async fn append_reaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<FindingSession>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::invalid("reaction body must not be empty"));
    }
    Ok(Json(state.findings.append_reaction(&id, body).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReflectRequest {
    /// A pre-written reflection; when absent the scenario engine
    /// generates one from the session record.
    pub text: Option<String>,
}

/// POST /findings/:id/reflection — the one-shot `active -> reflected`
/// transition. A second call is a conflict.
pub async fn reflect(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ReflectRequest>,
) -> Result<Json<FindingSession>, ApiError> {
    let text = match body.text {
        Some(text) if !text.is_empty() => text,
        _ => {
            let engine = state
                .engine
                .as_ref()
                .ok_or_else(|| ApiError::upstream("ANTHROPIC_API_KEY not configured"))?;
            let session = state.findings.get(&id).await?;
            if session.is_reflected() {
                // Fail before spending a generation on a session that will
                // refuse the write anyway.
                return Err(ApiError::conflict(format!(
                    "session {id} already has a reflection"
                )));
            }
            engine.reflect(&session).await?
        }
    };
    Ok(Json(state.findings.set_reflection(&id, text).await?))
}
