use serde::{Deserialize, Serialize};
use time::Date;

use crate::records::DayLog;

#[derive(Debug, Deserialize)]
pub struct DayRequest {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealToggleRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub meal_number: u32,
}

#[derive(Debug, Deserialize)]
pub struct SleepRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct SupplementToggleRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub name: String,
}

/// The day's log after the change.
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub date: Date,
    #[serde(flatten)]
    pub log: DayLog,
}
