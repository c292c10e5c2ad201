use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{HabitConditionResponse, ScoreRequest, SubmitRequest, SubmitResponse};
use super::habits::classify_habits;
use super::scoring::{calculate_quiz_score, QuizScoreResult};
use super::services::submit_quiz;
use crate::http::{internal, parse_email, parse_enum, today, ApiError};
use crate::program::types::Category;
use crate::records::StoredQuizResult;
use crate::state::AppState;

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/quiz/score", post(score))
        .route("/quiz/habit-condition", post(habit_condition))
        .route("/quiz/submit", post(submit))
        .route("/quiz/results/:email", get(latest_result))
}

/// Scores without storing anything.
#[instrument(skip(state, payload))]
pub async fn score(
    State(state): State<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<QuizScoreResult>, ApiError> {
    let category: Category = parse_enum(&payload.category)?;
    Ok(Json(calculate_quiz_score(
        &payload.responses,
        category,
        &state.scoring,
    )))
}

#[instrument(skip(payload))]
pub async fn habit_condition(
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<HabitConditionResponse>, ApiError> {
    let category: Category = parse_enum(&payload.category)?;
    Ok(Json(HabitConditionResponse {
        habit_condition: classify_habits(&payload.responses, category),
    }))
}

#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let email = parse_email(&payload.email)?;
    let category: Category = parse_enum(&payload.category)?;

    let (stored, profile) = submit_quiz(
        state.records.as_ref(),
        &state.scoring,
        &email,
        category,
        &payload.responses,
        today(),
    )
    .await
    .map_err(internal)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: stored.id,
            result: stored.result,
            profile,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn latest_result(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<StoredQuizResult>, ApiError> {
    let email = parse_email(&email)?;
    state
        .records
        .latest_quiz_result(&email)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Quiz result not found".into()))
}
