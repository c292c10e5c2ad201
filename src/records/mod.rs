//! Per-user records: quiz results, profiles, daily tracking and AI meal overrides.
//!
//! Values are addressed by email (and date); writes are last-write-wins and
//! toggles flip presence, so repeating one never duplicates a row.

pub mod memory;
pub mod postgres;
pub mod repo_types;

use axum::async_trait;
use time::Date;

use crate::meals::substitution::SubstitutedMeal;
use crate::quiz::{QuizResponses, QuizScoreResult};

pub use memory::MemoryRecords;
pub use postgres::PgRecords;
pub use repo_types::{DayLog, Profile, StoredQuizResult};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Appends a result; earlier results are never touched.
    async fn insert_quiz_result(
        &self,
        email: &str,
        responses: &QuizResponses,
        result: &QuizScoreResult,
    ) -> anyhow::Result<StoredQuizResult>;
    async fn latest_quiz_result(&self, email: &str) -> anyhow::Result<Option<StoredQuizResult>>;

    async fn get_profile(&self, email: &str) -> anyhow::Result<Option<Profile>>;
    async fn upsert_profile(&self, profile: &Profile) -> anyhow::Result<()>;

    /// Returns whether the meal is completed after the toggle.
    async fn toggle_meal(&self, email: &str, day: Date, meal_number: u32) -> anyhow::Result<bool>;
    async fn toggle_workout(&self, email: &str, day: Date) -> anyhow::Result<bool>;
    async fn set_sleep(&self, email: &str, day: Date, hours: f64) -> anyhow::Result<()>;
    async fn toggle_supplement(&self, email: &str, day: Date, name: &str) -> anyhow::Result<bool>;
    async fn day_log(&self, email: &str, day: Date) -> anyhow::Result<DayLog>;

    async fn set_meal_override(
        &self,
        email: &str,
        day: Date,
        meal: &SubstitutedMeal,
    ) -> anyhow::Result<()>;
    /// Ordered by meal number.
    async fn meal_overrides(&self, email: &str, day: Date) -> anyhow::Result<Vec<SubstitutedMeal>>;
    /// Returns whether an override existed.
    async fn delete_meal_override(
        &self,
        email: &str,
        day: Date,
        meal_number: u32,
    ) -> anyhow::Result<bool>;
}
