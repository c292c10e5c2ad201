use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{ChatRequest, ChatResponse};
use super::services::coach_chat;
use super::{acquire, coach_error};
use crate::http::{internal, parse_email, ApiError};
use crate::state::AppState;

pub fn coach_routes() -> Router<AppState> {
    Router::new().route("/coach/chat", post(chat))
}

#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let email = parse_email(&payload.email)?;
    let message = payload.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is required".into()));
    }

    let chat = acquire(&state, &email).await?;
    let profile = state.records.get_profile(&email).await.map_err(internal)?;
    let reply = coach_chat(chat.as_ref(), profile.as_ref(), &payload.history, message)
        .await
        .map_err(coach_error)?;

    Ok(Json(ChatResponse {
        reply: reply.content,
        model: reply.model,
    }))
}
