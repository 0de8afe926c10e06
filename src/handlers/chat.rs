// src/handlers/chat.rs
use crate::error::AppError;
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::{chat::converse, sentiment};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn chat_routes() -> Router {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload?;
    let provider = state.chat_provider.as_deref().ok_or_else(|| {
        AppError::ProviderFailure("no chat provider configured (set GEMINI_API_KEY)".to_string())
    })?;

    tracing::info!(
        history = payload.chat_history.len(),
        chars = payload.message.len(),
        "chat message received"
    );

    let reply = converse(
        provider,
        &state.conversation_log,
        &payload.message,
        &payload.chat_history,
    )
    .await?;

    Ok(Json(ChatResponse {
        mood: sentiment::mood(&reply),
        response: reply,
    }))
}
