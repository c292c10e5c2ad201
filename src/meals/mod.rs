pub mod catalog;
mod dto;
pub mod handlers;
pub mod services;
pub mod substitution;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::override_routes())
        .merge(handlers::ai_routes())
}
