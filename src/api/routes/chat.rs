//! Chat Routes
//!
//! AI assistant conversation endpoints. Both return 503 when no model
//! key is configured.
//!
//! - POST /api/chat - Send a message
//! - GET /api/chat/:session_id/history - Stored conversation thread

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{ChatHistoryResponse, ChatRequest, ChatResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// POST /api/chat
///
/// Sends one message to the assistant. When the session id belongs to a
/// connected wallet the assistant may execute operations for it; any
/// other id keeps a plain conversation.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = state.chat.as_ref().ok_or(ApiError::AssistantDisabled)?;

    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("message cannot be empty".to_string()));
    }

    let conversation = req.session_id.unwrap_or_else(Uuid::new_v4);
    let wallet = state
        .sessions
        .get(&conversation)
        .await
        .map(|session| session.address);

    let reply = chat
        .send(conversation, wallet.as_deref(), &req.message)
        .await;

    Ok(Json(ChatResponse {
        session_id: conversation,
        text: reply.text,
        function_call: reply.function_call,
        function_result: reply.function_result,
    }))
}

/// GET /api/chat/:session_id/history
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let chat = state.chat.as_ref().ok_or(ApiError::AssistantDisabled)?;

    let turns = chat.history(session_id).await;

    Ok(Json(ChatHistoryResponse {
        session_id,
        total: turns.len(),
        turns,
    }))
}
