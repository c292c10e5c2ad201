pub mod client;
mod dto;
pub mod handlers;
pub mod prompts;
pub mod rate_limit;
pub mod services;

use std::sync::Arc;

use axum::{http::StatusCode, Router};
use tracing::{error, warn};

use crate::http::ApiError;
use crate::state::AppState;

pub use client::{ChatClient, CoachError, OpenRouterClient};
pub use rate_limit::{MokaRateLimiter, RateLimitStore};

pub fn router() -> Router<AppState> {
    handlers::coach_routes()
}

/// The chat client for one request by `email`: 503 when no LLM is
/// configured, 429 when the user's budget for the window is spent.
pub(crate) async fn acquire(state: &AppState, email: &str) -> Result<Arc<dyn ChatClient>, ApiError> {
    let Some(chat) = state.coach.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "AI coach is not configured".into(),
        ));
    };
    if !state.limiter.try_acquire(email).await {
        warn!(%email, "coach rate limit reached");
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            "Too many coach requests, try again later".into(),
        ));
    }
    Ok(chat)
}

pub(crate) fn coach_error(e: CoachError) -> ApiError {
    error!(error = %e, "coach request failed");
    (StatusCode::BAD_GATEWAY, e.to_string())
}
