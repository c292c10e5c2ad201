use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument};

use super::dto::{
    DayRequest, MealToggleRequest, SleepRequest, SupplementToggleRequest, TrackingResponse,
};
use super::services::{resolve_supplement, validate_meal, validate_sleep, TrackingError};
use crate::http::{internal, parse_date, parse_email, require_profile, ApiError};
use crate::meals::services::load_day_meals;
use crate::state::AppState;

pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/tracking/:email/meals/toggle", post(toggle_meal))
        .route("/tracking/:email/workout/toggle", post(toggle_workout))
        .route("/tracking/:email/sleep", put(set_sleep))
        .route(
            "/tracking/:email/supplements/toggle",
            post(toggle_supplement),
        )
}

fn bad_request(e: TrackingError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn respond(state: &AppState, email: &str, day: Date) -> Result<Json<TrackingResponse>, ApiError> {
    let log = state.records.day_log(email, day).await.map_err(internal)?;
    Ok(Json(TrackingResponse { date: day, log }))
}

#[instrument(skip(state, payload))]
pub async fn toggle_meal(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<MealToggleRequest>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    let profile = require_profile(&state, &email).await?;

    let log = state.records.day_log(&email, day).await.map_err(internal)?;
    let meals = load_day_meals(&state.content, state.records.as_ref(), &profile, day, &log)
        .await
        .map_err(internal)?;
    let meal_number = validate_meal(&meals, payload.meal_number).map_err(bad_request)?;

    let completed = state
        .records
        .toggle_meal(&email, day, meal_number)
        .await
        .map_err(internal)?;
    info!(%email, %day, meal_number, completed, "meal toggled");
    respond(&state, &email, day).await
}

#[instrument(skip(state, payload))]
pub async fn toggle_workout(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<DayRequest>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    require_profile(&state, &email).await?;

    let done = state
        .records
        .toggle_workout(&email, day)
        .await
        .map_err(internal)?;
    info!(%email, %day, done, "workout toggled");
    respond(&state, &email, day).await
}

#[instrument(skip(state, payload))]
pub async fn set_sleep(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<SleepRequest>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    let hours = validate_sleep(payload.hours).map_err(bad_request)?;
    require_profile(&state, &email).await?;

    state
        .records
        .set_sleep(&email, day, hours)
        .await
        .map_err(internal)?;
    respond(&state, &email, day).await
}

#[instrument(skip(state, payload))]
pub async fn toggle_supplement(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<SupplementToggleRequest>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    let profile = require_profile(&state, &email).await?;
    let name = resolve_supplement(state.content.supplements(profile.category), &payload.name)
        .map_err(bad_request)?;

    let taken = state
        .records
        .toggle_supplement(&email, day, name)
        .await
        .map_err(internal)?;
    info!(%email, %day, supplement = name, taken, "supplement toggled");
    respond(&state, &email, day).await
}
