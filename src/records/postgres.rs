use anyhow::Context;
use axum::async_trait;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{DayLog, Profile, ProfileRow, QuizResultRow, StoredQuizResult};
use super::RecordStore;
use crate::meals::substitution::SubstitutedMeal;
use crate::quiz::{QuizResponses, QuizScoreResult};

#[derive(Clone)]
pub struct PgRecords {
    db: PgPool,
}

impl PgRecords {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// Toggles run delete-else-insert. A concurrent toggle on the same key may
// insert first, so the insert branch must tolerate an existing row.
const INSERT_COMPLETED_MEAL: &str = "INSERT INTO completed_meals (email, day, meal_number) \
     VALUES ($1, $2, $3) ON CONFLICT DO NOTHING";
const INSERT_COMPLETED_WORKOUT: &str =
    "INSERT INTO completed_workouts (email, day) VALUES ($1, $2) ON CONFLICT DO NOTHING";
const INSERT_SUPPLEMENT_INTAKE: &str = "INSERT INTO supplement_intake (email, day, supplement) \
     VALUES ($1, $2, $3) ON CONFLICT DO NOTHING";

fn meal_number_param(meal_number: u32) -> anyhow::Result<i32> {
    i32::try_from(meal_number).context("meal number out of range")
}

#[async_trait]
impl RecordStore for PgRecords {
    async fn insert_quiz_result(
        &self,
        email: &str,
        responses: &QuizResponses,
        result: &QuizScoreResult,
    ) -> anyhow::Result<StoredQuizResult> {
        let row = sqlx::query_as::<_, QuizResultRow>(
            r#"
            INSERT INTO quiz_results (id, email, responses, result)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, responses, result, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(Json(responses))
        .bind(Json(result))
        .fetch_one(&self.db)
        .await
        .context("insert quiz result")?;
        Ok(row.into())
    }

    async fn latest_quiz_result(&self, email: &str) -> anyhow::Result<Option<StoredQuizResult>> {
        let row = sqlx::query_as::<_, QuizResultRow>(
            r#"
            SELECT id, email, responses, result, created_at
            FROM quiz_results
            WHERE email = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select latest quiz result")?;
        Ok(row.map(Into::into))
    }

    async fn get_profile(&self, email: &str) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT email, category, level, workout_location, dietary_preference, program_start
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select profile")?;
        row.map(Profile::try_from).transpose()
    }

    async fn upsert_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles
                (email, category, level, workout_location, dietary_preference, program_start)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET
                category = EXCLUDED.category,
                level = EXCLUDED.level,
                workout_location = EXCLUDED.workout_location,
                dietary_preference = EXCLUDED.dietary_preference,
                program_start = EXCLUDED.program_start,
                updated_at = now()
            "#,
        )
        .bind(&profile.email)
        .bind(profile.category.as_str())
        .bind(profile.level.as_str())
        .bind(profile.workout_location.as_str())
        .bind(profile.dietary_preference.as_str())
        .bind(profile.program_start)
        .execute(&self.db)
        .await
        .context("upsert profile")?;
        Ok(())
    }

    async fn toggle_meal(&self, email: &str, day: Date, meal_number: u32) -> anyhow::Result<bool> {
        let meal_number = meal_number_param(meal_number)?;
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query(
            "DELETE FROM completed_meals WHERE email = $1 AND day = $2 AND meal_number = $3",
        )
        .bind(email)
        .bind(day)
        .bind(meal_number)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if removed == 0 {
            sqlx::query(INSERT_COMPLETED_MEAL)
            .bind(email)
            .bind(day)
            .bind(meal_number)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await.context("toggle meal")?;
        Ok(removed == 0)
    }

    async fn toggle_workout(&self, email: &str, day: Date) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query("DELETE FROM completed_workouts WHERE email = $1 AND day = $2")
            .bind(email)
            .bind(day)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            sqlx::query(INSERT_COMPLETED_WORKOUT)
                .bind(email)
                .bind(day)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await.context("toggle workout")?;
        Ok(removed == 0)
    }

    async fn set_sleep(&self, email: &str, day: Date, hours: f64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sleep_logs (email, day, hours)
            VALUES ($1, $2, $3)
            ON CONFLICT (email, day) DO UPDATE SET hours = EXCLUDED.hours
            "#,
        )
        .bind(email)
        .bind(day)
        .bind(hours)
        .execute(&self.db)
        .await
        .context("upsert sleep log")?;
        Ok(())
    }

    async fn toggle_supplement(&self, email: &str, day: Date, name: &str) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query(
            "DELETE FROM supplement_intake WHERE email = $1 AND day = $2 AND supplement = $3",
        )
        .bind(email)
        .bind(day)
        .bind(name)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if removed == 0 {
            sqlx::query(INSERT_SUPPLEMENT_INTAKE)
            .bind(email)
            .bind(day)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await.context("toggle supplement")?;
        Ok(removed == 0)
    }

    async fn day_log(&self, email: &str, day: Date) -> anyhow::Result<DayLog> {
        let meals: Vec<i32> = sqlx::query_scalar(
            "SELECT meal_number FROM completed_meals WHERE email = $1 AND day = $2",
        )
        .bind(email)
        .bind(day)
        .fetch_all(&self.db)
        .await
        .context("select completed meals")?;

        let workout_done: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM completed_workouts WHERE email = $1 AND day = $2)",
        )
        .bind(email)
        .bind(day)
        .fetch_one(&self.db)
        .await
        .context("select completed workout")?;

        let sleep_hours: Option<f64> =
            sqlx::query_scalar("SELECT hours FROM sleep_logs WHERE email = $1 AND day = $2")
                .bind(email)
                .bind(day)
                .fetch_optional(&self.db)
                .await
                .context("select sleep log")?;

        let supplements: Vec<String> = sqlx::query_scalar(
            "SELECT supplement FROM supplement_intake WHERE email = $1 AND day = $2",
        )
        .bind(email)
        .bind(day)
        .fetch_all(&self.db)
        .await
        .context("select supplement intake")?;

        Ok(DayLog {
            completed_meals: meals
                .into_iter()
                .filter_map(|n| u32::try_from(n).ok())
                .collect(),
            workout_done,
            sleep_hours,
            supplements_taken: supplements.into_iter().collect(),
        })
    }

    async fn set_meal_override(
        &self,
        email: &str,
        day: Date,
        meal: &SubstitutedMeal,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meal_overrides (email, day, meal_number, meal)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email, day, meal_number) DO UPDATE SET
                meal = EXCLUDED.meal,
                updated_at = now()
            "#,
        )
        .bind(email)
        .bind(day)
        .bind(meal_number_param(meal.meal_number)?)
        .bind(Json(meal))
        .execute(&self.db)
        .await
        .context("upsert meal override")?;
        Ok(())
    }

    async fn meal_overrides(&self, email: &str, day: Date) -> anyhow::Result<Vec<SubstitutedMeal>> {
        let rows: Vec<Json<SubstitutedMeal>> = sqlx::query_scalar(
            r#"
            SELECT meal
            FROM meal_overrides
            WHERE email = $1 AND day = $2
            ORDER BY meal_number
            "#,
        )
        .bind(email)
        .bind(day)
        .fetch_all(&self.db)
        .await
        .context("select meal overrides")?;
        Ok(rows.into_iter().map(|Json(meal)| meal).collect())
    }

    async fn delete_meal_override(
        &self,
        email: &str,
        day: Date,
        meal_number: u32,
    ) -> anyhow::Result<bool> {
        let removed = sqlx::query(
            "DELETE FROM meal_overrides WHERE email = $1 AND day = $2 AND meal_number = $3",
        )
        .bind(email)
        .bind(day)
        .bind(meal_number_param(meal_number)?)
        .execute(&self.db)
        .await
        .context("delete meal override")?
        .rows_affected();
        Ok(removed > 0)
    }
}
