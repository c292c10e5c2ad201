use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{AiSwapRequest, OverrideRequest};
use super::services::{
    calories_plausible, load_day_meals, prepare_override, MealSource, PlannedMeal,
    MAX_MEAL_CALORIES,
};
use super::substitution::SubstitutedMeal;
use crate::coach::{acquire, coach_error, services::generate_meal_swap};
use crate::http::{internal, parse_date, parse_email, require_profile, ApiError};
use crate::state::AppState;

pub fn override_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/:email/overrides", put(set_override))
        .route(
            "/meals/:email/overrides/:date/:meal_number",
            delete(delete_override),
        )
}

pub fn ai_routes() -> Router<AppState> {
    Router::new().route("/meals/:email/ai-swap", post(ai_swap))
}

fn validate_meal(meal: &SubstitutedMeal) -> Result<(), ApiError> {
    if meal.meal_number == 0 {
        return Err((StatusCode::BAD_REQUEST, "meal_number starts at 1".into()));
    }
    if meal.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "meal name is required".into()));
    }
    if meal.ingredients.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "meal needs ingredients".into()));
    }
    if !calories_plausible(meal.ingredients.iter().map(|i| &i.ingredient)) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("meal calories must stay within {MAX_MEAL_CALORIES} kcal"),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn set_override(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<OverrideRequest>,
) -> Result<Json<SubstitutedMeal>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    validate_meal(&payload.meal)?;
    let profile = require_profile(&state, &email).await?;

    let meal = prepare_override(payload.meal, profile.dietary_preference);
    state
        .records
        .set_meal_override(&email, day, &meal)
        .await
        .map_err(internal)?;
    info!(%email, %day, meal_number = meal.meal_number, "meal override stored");
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_override(
    State(state): State<AppState>,
    Path((email, date, meal_number)): Path<(String, String, u32)>,
) -> Result<StatusCode, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(Some(date.as_str()))?;
    let removed = state
        .records
        .delete_meal_override(&email, day, meal_number)
        .await
        .map_err(internal)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Override not found".into()))
    }
}

/// Replaces one meal of the day with a model-generated one and stores it.
#[instrument(skip(state, payload))]
pub async fn ai_swap(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<AiSwapRequest>,
) -> Result<Json<PlannedMeal>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(payload.date.as_deref())?;
    let profile = require_profile(&state, &email).await?;

    let log = state.records.day_log(&email, day).await.map_err(internal)?;
    let meals = load_day_meals(&state.content, state.records.as_ref(), &profile, day, &log)
        .await
        .map_err(internal)?;
    let current = meals
        .into_iter()
        .find(|m| m.meal.meal_number == payload.meal_number)
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;

    let chat = acquire(&state, &email).await?;
    let meal = generate_meal_swap(chat.as_ref(), &profile, &current.meal, payload.wish.as_deref())
        .await
        .map_err(coach_error)?;
    state
        .records
        .set_meal_override(&email, day, &meal)
        .await
        .map_err(internal)?;

    Ok(Json(PlannedMeal {
        meal,
        source: MealSource::AiOverride,
        completed: current.completed,
    }))
}
