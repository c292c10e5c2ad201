use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::QuizResponses;
use super::habits::HabitCondition;
use super::scoring::QuizScoreResult;
use crate::records::Profile;

/// Enum fields arrive as strings so that values outside the set answer 400.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub category: String,
    #[serde(default)]
    pub responses: QuizResponses,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub email: String,
    pub category: String,
    #[serde(default)]
    pub responses: QuizResponses,
}

#[derive(Debug, Serialize)]
pub struct HabitConditionResponse {
    pub habit_condition: HabitCondition,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub result: QuizScoreResult,
    pub profile: Profile,
}
