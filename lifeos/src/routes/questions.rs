//! Open-question routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lifeos_core::questions::{NewQuestion, OpenQuestion, QuestionPatch};
use serde::Serialize;

#[derive(Serialize)]
pub struct QuestionList {
    questions: Vec<OpenQuestion>,
}

/// GET /open-questions
pub async fn list(State(state): State<AppState>) -> Result<Json<QuestionList>, ApiError> {
    Ok(Json(QuestionList {
        questions: state.questions.list().await?,
    }))
}

/// POST /open-questions
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewQuestion>,
) -> Result<Json<OpenQuestion>, ApiError> {
    if body.name.is_empty() || body.question.is_empty() {
        return Err(ApiError::invalid("name and question are required"));
    }
    Ok(Json(state.questions.create(body).await?))
}

/// GET /open-questions/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OpenQuestion>, ApiError> {
    Ok(Json(state.questions.get(&id).await?))
}

/// PUT /open-questions/:id — partial-field merge, including the
/// open/resolved toggle.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<QuestionPatch>,
) -> Result<Json<OpenQuestion>, ApiError> {
    Ok(Json(state.questions.update(&id, patch).await?))
}

/// DELETE /open-questions/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.questions.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
