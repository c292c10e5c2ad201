pub mod answers;
mod dto;
pub mod habits;
pub mod handlers;
pub mod scoring;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use answers::QuizResponses;
pub use scoring::{QuizScoreResult, ScoringConfig};

pub fn router() -> Router<AppState> {
    handlers::quiz_routes()
}
