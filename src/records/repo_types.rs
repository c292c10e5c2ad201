use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::program::types::{Category, DietaryPreference, Level, ProgramAssignment, WorkoutLocation};
use crate::quiz::{QuizResponses, QuizScoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub category: Category,
    pub level: Level,
    pub workout_location: WorkoutLocation,
    pub dietary_preference: DietaryPreference,
    pub program_start: Date,
}

impl Profile {
    pub fn assignment(&self) -> ProgramAssignment {
        ProgramAssignment {
            category: self.category,
            level: self.level,
            workout_location: self.workout_location,
        }
    }
}

/// Enum columns are TEXT; parsed on the way out.
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub email: String,
    pub category: String,
    pub level: String,
    pub workout_location: String,
    pub dietary_preference: String,
    pub program_start: Date,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(r: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            category: r.category.parse()?,
            level: r.level.parse()?,
            workout_location: r.workout_location.parse()?,
            dietary_preference: r.dietary_preference.parse()?,
            program_start: r.program_start,
            email: r.email,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuizResult {
    pub id: Uuid,
    pub email: String,
    pub responses: QuizResponses,
    pub result: QuizScoreResult,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct QuizResultRow {
    pub id: Uuid,
    pub email: String,
    pub responses: Json<QuizResponses>,
    pub result: Json<QuizScoreResult>,
    pub created_at: OffsetDateTime,
}

impl From<QuizResultRow> for StoredQuizResult {
    fn from(r: QuizResultRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            responses: r.responses.0,
            result: r.result.0,
            created_at: r.created_at,
        }
    }
}

/// Everything tracked for one user on one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub completed_meals: BTreeSet<u32>,
    pub workout_done: bool,
    pub sleep_hours: Option<f64>,
    pub supplements_taken: BTreeSet<String>,
}
