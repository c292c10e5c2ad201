use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::{Supplement, WeeklyMeals, WeeklyWorkouts};
use crate::program::types::{Category, Level, WorkoutLocation};
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/meals/:category/:level", get(get_meal_plan))
        .route(
            "/plans/workouts/:category/:level/:location",
            get(get_workout_plan),
        )
        .route("/plans/supplements/:category", get(get_supplements))
}

#[instrument(skip(state))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    Path((category, level)): Path<(Category, Level)>,
) -> Result<Json<WeeklyMeals>, (StatusCode, String)> {
    match state.content.meal_plan(category, level) {
        Some(plan) => Ok(Json(plan.clone())),
        None => {
            warn!(%category, %level, "meal plan missing");
            Err((StatusCode::NOT_FOUND, "Meal plan not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_workout_plan(
    State(state): State<AppState>,
    Path((category, level, location)): Path<(Category, Level, WorkoutLocation)>,
) -> Result<Json<WeeklyWorkouts>, (StatusCode, String)> {
    state
        .content
        .workout_plan(category, level, location)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Workout plan not found".into()))
}

#[instrument(skip(state))]
pub async fn get_supplements(
    State(state): State<AppState>,
    Path(category): Path<Category>,
) -> Json<Vec<Supplement>> {
    Json(state.content.supplements(category).to_vec())
}
