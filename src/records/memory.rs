use std::collections::{BTreeMap, HashMap};

use axum::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{DayLog, Profile, StoredQuizResult};
use super::RecordStore;
use crate::meals::substitution::SubstitutedMeal;
use crate::quiz::{QuizResponses, QuizScoreResult};

type DayKey = (String, Date);

#[derive(Default)]
struct Inner {
    quiz_results: Vec<StoredQuizResult>,
    profiles: HashMap<String, Profile>,
    days: HashMap<DayKey, DayLog>,
    overrides: HashMap<DayKey, BTreeMap<u32, SubstitutedMeal>>,
}

/// Process-local store used by tests and `AppState::fake()`.
#[derive(Default)]
pub struct MemoryRecords {
    inner: RwLock<Inner>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(email: &str, day: Date) -> DayKey {
    (email.to_string(), day)
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn insert_quiz_result(
        &self,
        email: &str,
        responses: &QuizResponses,
        result: &QuizScoreResult,
    ) -> anyhow::Result<StoredQuizResult> {
        let stored = StoredQuizResult {
            id: Uuid::new_v4(),
            email: email.to_string(),
            responses: responses.clone(),
            result: result.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.write().await.quiz_results.push(stored.clone());
        Ok(stored)
    }

    async fn latest_quiz_result(&self, email: &str) -> anyhow::Result<Option<StoredQuizResult>> {
        let inner = self.inner.read().await;
        Ok(inner
            .quiz_results
            .iter()
            .rev()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn get_profile(&self, email: &str) -> anyhow::Result<Option<Profile>> {
        Ok(self.inner.read().await.profiles.get(email).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.email.clone(), profile.clone());
        Ok(())
    }

    async fn toggle_meal(&self, email: &str, day: Date, meal_number: u32) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let log = inner.days.entry(key(email, day)).or_default();
        if log.completed_meals.remove(&meal_number) {
            Ok(false)
        } else {
            log.completed_meals.insert(meal_number);
            Ok(true)
        }
    }

    async fn toggle_workout(&self, email: &str, day: Date) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let log = inner.days.entry(key(email, day)).or_default();
        log.workout_done = !log.workout_done;
        Ok(log.workout_done)
    }

    async fn set_sleep(&self, email: &str, day: Date, hours: f64) -> anyhow::Result<()> {
        let mut inner = self.inner.write().await;
        inner.days.entry(key(email, day)).or_default().sleep_hours = Some(hours);
        Ok(())
    }

    async fn toggle_supplement(&self, email: &str, day: Date, name: &str) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let log = inner.days.entry(key(email, day)).or_default();
        if log.supplements_taken.remove(name) {
            Ok(false)
        } else {
            log.supplements_taken.insert(name.to_string());
            Ok(true)
        }
    }

    async fn day_log(&self, email: &str, day: Date) -> anyhow::Result<DayLog> {
        let inner = self.inner.read().await;
        Ok(inner.days.get(&key(email, day)).cloned().unwrap_or_default())
    }

    async fn set_meal_override(
        &self,
        email: &str,
        day: Date,
        meal: &SubstitutedMeal,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .overrides
            .entry(key(email, day))
            .or_default()
            .insert(meal.meal_number, meal.clone());
        Ok(())
    }

    async fn meal_overrides(&self, email: &str, day: Date) -> anyhow::Result<Vec<SubstitutedMeal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .overrides
            .get(&key(email, day))
            .map(|meals| meals.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_meal_override(
        &self,
        email: &str,
        day: Date,
        meal_number: u32,
    ) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .overrides
            .get_mut(&key(email, day))
            .and_then(|meals| meals.remove(&meal_number))
            .is_some())
    }
}
