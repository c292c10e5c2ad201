use thiserror::Error;

use crate::content::Supplement;
use crate::meals::services::PlannedMeal;

pub const MAX_SLEEP_HOURS: f64 = 24.0;

#[derive(Debug, Error, PartialEq)]
pub enum TrackingError {
    #[error("sleep hours must be between 0 and 24, got {0}")]
    SleepOutOfRange(f64),
    #[error("no meal {0} on this day")]
    UnknownMeal(u32),
    #[error("{0:?} is not part of this program's supplements")]
    UnknownSupplement(String),
}

pub fn validate_sleep(hours: f64) -> Result<f64, TrackingError> {
    if hours.is_finite() && (0.0..=MAX_SLEEP_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(TrackingError::SleepOutOfRange(hours))
    }
}

pub fn validate_meal(meals: &[PlannedMeal], meal_number: u32) -> Result<u32, TrackingError> {
    meals
        .iter()
        .any(|m| m.meal.meal_number == meal_number)
        .then_some(meal_number)
        .ok_or(TrackingError::UnknownMeal(meal_number))
}

/// Canonical supplement name; matching ignores case and surrounding spaces.
pub fn resolve_supplement<'a>(
    supplements: &'a [Supplement],
    name: &str,
) -> Result<&'a str, TrackingError> {
    let wanted = name.trim();
    supplements
        .iter()
        .find(|s| s.name.to_lowercase() == wanted.to_lowercase())
        .map(|s| s.name.as_str())
        .ok_or_else(|| TrackingError::UnknownSupplement(wanted.to_string()))
}
