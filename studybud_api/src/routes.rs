//! HTTP API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studybud_core::{ChatEngine, ChatPayload, HistoryStore, SessionRegistry, StoredMessage};
use tracing::info;

use crate::error::ApiError;

/// Upper bound on rows consulted when counting a session's messages.
const SESSION_INFO_LIMIT: u64 = 1000;

const DEFAULT_HISTORY_LIMIT: u64 = 50;

/// Application state shared by all handlers. The registry and history
/// handles are the same ones the engine owns.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub registry: Arc<SessionRegistry>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    #[must_use]
    pub fn new(
        engine: Arc<ChatEngine>,
        registry: Arc<SessionRegistry>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            engine,
            registry,
            history,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/chat", post(chat))
        .route("/api/sessions/create", post(create_session))
        .route("/api/sessions/:id", get(session_info))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/history", post(history))
        .with_state(state)
}

async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: ChatPayload,
    pub session_id: String,
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let outcome = state
        .engine
        .handle(
            &request.message,
            request.intent.as_deref(),
            request.session_id.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        kind: outcome.kind.to_string(),
        payload: outcome.payload,
        session_id: outcome.session_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let (session_id, meta) = state.registry.create().await;
    info!("Created session: {session_id}");
    Json(SessionCreated {
        session_id,
        created_at: meta.created_at,
    })
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

async fn session_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>, ApiError> {
    let meta = state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    let messages = state.history.list(&id, SESSION_INFO_LIMIT).await?;

    Ok(Json(SessionInfo {
        session_id: id,
        created_at: meta.created_at,
        message_count: messages.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub session_id: String,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<StoredMessage>,
    pub total: usize,
}

async fn history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = request.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let messages = state.history.list(&request.session_id, limit).await?;

    Ok(Json(HistoryResponse {
        session_id: request.session_id,
        total: messages.len(),
        messages,
    }))
}

#[derive(Debug, Serialize)]
pub struct SessionCleared {
    pub status: &'static str,
    pub session_id: String,
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionCleared>, ApiError> {
    state.history.clear(&id).await?;
    state.registry.remove(&id).await;
    info!("Cleared session: {id}");

    Ok(Json(SessionCleared {
        status: "cleared",
        session_id: id,
    }))
}
