//! Assistant chat endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use nimbus_core::ChatTurn;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

/// POST /ai/chat
///
/// Forwards the message and prior turns to the chat backend; no bearer
/// token is required, abuse is bounded by the route's rate limiter. The
/// backend owns model fallback; by the time an error reaches here every
/// candidate was exhausted, and the client sees a generic 503.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let reply = state.chat.chat(&req.message, &req.history).await?;
    Ok(Json(serde_json::json!({ "reply": reply })))
}
