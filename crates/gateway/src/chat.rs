//! Assistant chat endpoints.

use crate::{ApiError, SharedState, api_error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Shown when the assistant loop fails; details go in `error`.
pub const APOLOGY: &str =
    "I'm sorry, I couldn't process that request right now. Please try again in a moment.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,

    /// What the user is looking at, as text or any JSON value
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub tools_used: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub(crate) async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message is required"));
    }
    info!(message_len = message.len(), "Chat request");

    let page_context = payload.context.as_ref().and_then(page_context_text);
    match state.assistant.respond(message, page_context.as_deref()).await {
        Ok(reply) => Ok(Json(ChatResponse {
            response: reply.text,
            tools_used: reply.tools_used,
            error: None,
        })),
        Err(e) => {
            error!(error = %e, "Assistant failed");
            Ok(Json(ChatResponse {
                response: APOLOGY.into(),
                tools_used: 0,
                error: Some(e.to_string()),
            }))
        }
    }
}

fn page_context_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct SimpleChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SimpleChatResponse {
    pub response: String,
    pub success: bool,
}

pub(crate) async fn chat_simple_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SimpleChatRequest>,
) -> Result<Json<SimpleChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message is required"));
    }
    info!(message_len = message.len(), "Simple chat request");

    Ok(Json(SimpleChatResponse {
        response: state.simple.respond(message).await,
        success: true,
    }))
}
