use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{DashboardQuery, ProfileView, ProgramChangeRequest};
use super::services::{build_dashboard, change_program, program_day, Dashboard};
use super::types::{Level, WorkoutLocation};
use crate::http::{internal, parse_date, parse_email, parse_enum, require_profile, today, ApiError};
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/:email", get(get_profile))
        .route(
            "/profile/:email/preference/toggle",
            post(toggle_preference),
        )
        .route("/profile/:email/program", put(update_program))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/:email", get(get_dashboard))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let email = parse_email(&email)?;
    let profile = require_profile(&state, &email).await?;
    let day = program_day(profile.program_start, today());
    Ok(Json(ProfileView::new(profile, day)))
}

/// omnivor → pescatarian → vegetarian → vegan → omnivor.
#[instrument(skip(state))]
pub async fn toggle_preference(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let email = parse_email(&email)?;
    let mut profile = require_profile(&state, &email).await?;
    profile.dietary_preference = profile.dietary_preference.next();
    state
        .records
        .upsert_profile(&profile)
        .await
        .map_err(internal)?;
    info!(%email, preference = %profile.dietary_preference, "dietary preference toggled");
    let day = program_day(profile.program_start, today());
    Ok(Json(ProfileView::new(profile, day)))
}

#[instrument(skip(state, payload))]
pub async fn update_program(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<ProgramChangeRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let email = parse_email(&email)?;
    if payload.category.is_some() {
        return Err((
            StatusCode::BAD_REQUEST,
            "category cannot be changed during a program".into(),
        ));
    }
    let level = payload
        .level
        .as_deref()
        .map(parse_enum::<Level>)
        .transpose()?;
    let location = payload
        .workout_location
        .as_deref()
        .map(parse_enum::<WorkoutLocation>)
        .transpose()?;

    let mut profile = require_profile(&state, &email).await?;
    change_program(&mut profile, level, location);
    state
        .records
        .upsert_profile(&profile)
        .await
        .map_err(internal)?;
    info!(%email, level = %profile.level, location = %profile.workout_location, "program changed");
    let day = program_day(profile.program_start, today());
    Ok(Json(ProfileView::new(profile, day)))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let email = parse_email(&email)?;
    let day = parse_date(query.date.as_deref())?;
    let profile = require_profile(&state, &email).await?;
    build_dashboard(&state.content, state.records.as_ref(), &profile, day)
        .await
        .map(Json)
        .map_err(internal)
}
