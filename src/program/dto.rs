use serde::{Deserialize, Serialize};

use super::services::PROGRAM_DAYS;
use crate::records::Profile;

#[derive(Debug, Deserialize)]
pub struct ProgramChangeRequest {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub workout_location: Option<String>,
    /// Only present to reject it: the category is fixed for the program.
    #[serde(default)]
    pub category: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub program_day: u32,
    pub program_days: u32,
}

impl ProfileView {
    pub fn new(profile: Profile, program_day: u32) -> Self {
        Self {
            profile,
            program_day,
            program_days: PROGRAM_DAYS,
        }
    }
}
