//! Scenario chat routes: one-shot generation, the SSE relay, and the
//! append-only conversation/correction logs.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use claude::{Message, StreamEvent};
use futures::{Stream, StreamExt};
use lifeos_core::scenario::{
    Conversation, ConversationSummary, Correction, NewCorrection, ScenarioContext, ScenarioEngine,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub vignette_id: String,
    pub message: String,
    /// When set, the turn is part of a logged conversation; when absent
    /// it is a one-shot generation served through the cache.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub reply: String,
    pub conversation_id: Option<String>,
    pub cached: bool,
}

fn require_engine(state: &AppState) -> Result<Arc<ScenarioEngine>, ApiError> {
    state
        .engine
        .clone()
        .ok_or_else(|| ApiError::upstream("ANTHROPIC_API_KEY not configured"))
}

/// Assemble the generation context from the live canon and PKG documents.
async fn load_context(state: &AppState) -> Result<ScenarioContext, ApiError> {
    let setting = state.world.setting().await?;
    let thesis = state.world.thesis().await?;
    let mut pkg = Vec::new();
    for name in state.pkg.list().await? {
        let doc = state.pkg.document(&name).await?;
        pkg.push((name, doc));
    }
    Ok(ScenarioContext {
        setting,
        thesis,
        pkg,
    })
}

fn history_messages(conversation: &Conversation) -> Vec<Message> {
    conversation
        .messages
        .iter()
        .map(|m| {
            if m.role == "user" {
                Message::user(&m.content)
            } else {
                Message::assistant(&m.content)
            }
        })
        .collect()
}

/// POST /scenario/generate — one full twin turn.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.message.is_empty() {
        return Err(ApiError::invalid("message is required"));
    }
    let engine = require_engine(&state)?;
    let vignette = state.vignettes.get(&body.vignette_id).await?;
    let ctx = load_context(&state).await?;

    match body.conversation_id {
        // One-shot generations are cacheable; nothing is logged.
        None => {
            let key = format!("{}\n{}", body.vignette_id, body.message);
            if let Some(reply) = state.cache.lock().await.get(&key) {
                return Ok(Json(GenerateResponse {
                    reply,
                    conversation_id: None,
                    cached: true,
                }));
            }
            let reply = engine
                .generate(&vignette, &ctx, Vec::new(), &body.message)
                .await?;
            state.cache.lock().await.insert(key, reply.clone());
            Ok(Json(GenerateResponse {
                reply,
                conversation_id: None,
                cached: false,
            }))
        }
        // Conversational turns bypass the cache and append both sides to
        // the log.
        Some(conversation_id) => {
            let conversation = state.conversations.get(&conversation_id).await?;
            let history = history_messages(&conversation);
            let reply = engine
                .generate(&vignette, &ctx, history, &body.message)
                .await?;
            state
                .conversations
                .append(&conversation_id, "user", &body.message)
                .await?;
            state
                .conversations
                .append(&conversation_id, "twin", &reply)
                .await?;
            Ok(Json(GenerateResponse {
                reply,
                conversation_id: Some(conversation_id),
                cached: false,
            }))
        }
    }
}

/// POST /scenario/stream — the SSE relay.
///
/// Upstream stream events are forwarded as SSE events; when the client
/// disconnects, axum drops this stream, which drops the upstream request
/// and aborts the generation. The twin's completed text is not logged
/// here — the client appends it via the conversation messages route once
/// the stream finishes.
pub async fn stream(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if body.message.is_empty() {
        return Err(ApiError::invalid("message is required"));
    }
    let engine = require_engine(&state)?;
    let vignette = state.vignettes.get(&body.vignette_id).await?;
    let ctx = load_context(&state).await?;

    let history = match &body.conversation_id {
        Some(id) => {
            let conversation = state.conversations.get(id).await?;
            state.conversations.append(id, "user", &body.message).await?;
            history_messages(&conversation)
        }
        None => Vec::new(),
    };

    let upstream = engine
        .stream(&vignette, &ctx, history, &body.message)
        .await?;

    let sse_stream = upstream.map(|result| {
        let event = match result {
            Ok(event) => sse_event(event),
            Err(e) => Event::default()
                .event("error")
                .data(json!({ "message": e.to_string() }).to_string()),
        };
        Ok::<Event, Infallible>(event)
    });
    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn sse_event(event: StreamEvent) -> Event {
    match event {
        StreamEvent::MessageStart { id, model } => Event::default()
            .event("start")
            .data(json!({ "id": id, "model": model }).to_string()),
        StreamEvent::TextDelta { text } => Event::default()
            .event("delta")
            .data(json!({ "text": text }).to_string()),
        StreamEvent::MessageDelta { .. } => Event::default().event("message_delta").data("{}"),
        StreamEvent::MessageStop => Event::default().event("done").data("{}"),
        StreamEvent::Ping => Event::default().event("ping").data("{}"),
        StreamEvent::Error { message } => Event::default()
            .event("error")
            .data(json!({ "message": message }).to_string()),
    }
}

// ============================================================================
// Conversation and correction logs
// ============================================================================

#[derive(Serialize)]
pub struct ConversationList {
    conversations: Vec<ConversationSummary>,
}

/// GET /scenario/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ConversationList>, ApiError> {
    Ok(Json(ConversationList {
        conversations: state.conversations.list().await?,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct StartConversation {
    #[serde(default)]
    pub vignette_id: Option<String>,
}

/// POST /scenario/conversations — open a new log.
pub async fn start_conversation(
    State(state): State<AppState>,
    Json(body): Json<StartConversation>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.conversations.create(body.vignette_id).await?))
}

/// GET /scenario/conversations/:id
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.conversations.get(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AppendMessage {
    pub role: String,
    pub content: String,
}

/// PATCH /scenario/conversations/:id/messages — append one message.
pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AppendMessage>,
) -> Result<Json<Conversation>, ApiError> {
    if body.role.is_empty() || body.content.is_empty() {
        return Err(ApiError::invalid("role and content are required"));
    }
    Ok(Json(
        state.conversations.append(&id, body.role, body.content).await?,
    ))
}

#[derive(Serialize)]
pub struct CorrectionList {
    corrections: Vec<Correction>,
}

/// GET /scenario/corrections
pub async fn list_corrections(
    State(state): State<AppState>,
) -> Result<Json<CorrectionList>, ApiError> {
    Ok(Json(CorrectionList {
        corrections: state.corrections.list().await?,
    }))
}

/// POST /scenario/corrections — flag a twin output.
pub async fn log_correction(
    State(state): State<AppState>,
    Json(body): Json<NewCorrection>,
) -> Result<Json<Correction>, ApiError> {
    if body.flagged.is_empty() {
        return Err(ApiError::invalid("flagged text is required"));
    }
    Ok(Json(state.corrections.create(body).await?))
}
