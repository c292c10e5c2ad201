//! Helpers shared by the handlers.

use std::str::FromStr;

use axum::http::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use time::{Date, OffsetDateTime};
use tracing::{error, warn};

use crate::program::types::parse_iso_date;
use crate::records::Profile;
use crate::state::AppState;

pub type ApiError = (StatusCode, String);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed, lowercased email or 400.
pub(crate) fn parse_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }
    Ok(email)
}

/// Closed-enum value from a request body, 400 when outside the set.
pub(crate) fn parse_enum<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// `YYYY-MM-DD`, or today (UTC) when absent.
pub(crate) fn parse_date(raw: Option<&str>) -> Result<Date, ApiError> {
    match raw {
        Some(raw) => parse_iso_date(raw)
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid date: {raw:?}"))),
        None => Ok(today()),
    }
}

pub(crate) fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn internal(e: anyhow::Error) -> ApiError {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Stored profile for `email`, 404 when the quiz was never submitted.
pub(crate) async fn require_profile(state: &AppState, email: &str) -> Result<Profile, ApiError> {
    state
        .records
        .get_profile(email)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(%email, "profile not found");
            (StatusCode::NOT_FOUND, "Profile not found".into())
        })
}
