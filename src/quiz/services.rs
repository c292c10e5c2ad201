use time::Date;
use tracing::info;

use super::answers::QuizResponses;
use super::scoring::{calculate_quiz_score, ScoringConfig};
use crate::program::types::{Category, DietaryPreference};
use crate::records::{Profile, RecordStore, StoredQuizResult};

/// Scores a completed quiz, appends the result and (re)starts the program.
///
/// A retake keeps the stored dietary preference; everything else follows the
/// new result and the program starts over on `today`.
pub async fn submit_quiz(
    records: &dyn RecordStore,
    scoring: &ScoringConfig,
    email: &str,
    category: Category,
    responses: &QuizResponses,
    today: Date,
) -> anyhow::Result<(StoredQuizResult, Profile)> {
    let result = calculate_quiz_score(responses, category, scoring);
    let stored = records.insert_quiz_result(email, responses, &result).await?;

    let dietary_preference = records
        .get_profile(email)
        .await?
        .map(|p| p.dietary_preference)
        .unwrap_or(DietaryPreference::Omnivor);

    let profile = Profile {
        email: email.to_string(),
        category,
        level: result.level,
        workout_location: result.workout_location,
        dietary_preference,
        program_start: today,
    };
    records.upsert_profile(&profile).await?;

    info!(
        %email,
        %category,
        level = %result.level,
        total = result.total,
        "quiz submitted"
    );
    Ok((stored, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::answers::Answer;
    use crate::records::MemoryRecords;
    use time::macros::date;

    fn responses() -> QuizResponses {
        [
            ("mus_q1", Answer::Number(2.0)),
            ("mus_q11", Answer::Text("balanced".into())),
            ("mus_q18", Answer::Text("gym".into())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[tokio::test]
    async fn new_user_gets_omnivor_profile() {
        let store = MemoryRecords::new();
        let (stored, profile) = submit_quiz(
            &store,
            &ScoringConfig::default(),
            "new@user.io",
            Category::Muscle,
            &responses(),
            date!(2024 - 06 - 01),
        )
        .await
        .unwrap();

        assert_eq!(profile.dietary_preference, DietaryPreference::Omnivor);
        assert_eq!(profile.workout_location, stored.result.workout_location);
        assert_eq!(profile.level, stored.result.level);
        assert_eq!(store.get_profile("new@user.io").await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn retake_keeps_preference_and_appends_result() {
        let store = MemoryRecords::new();
        let scoring = ScoringConfig::default();
        let (first, mut profile) = submit_quiz(
            &store,
            &scoring,
            "again@user.io",
            Category::Energy,
            &QuizResponses::new(),
            date!(2024 - 06 - 01),
        )
        .await
        .unwrap();
        profile.dietary_preference = DietaryPreference::Vegan;
        store.upsert_profile(&profile).await.unwrap();

        let (second, profile) = submit_quiz(
            &store,
            &scoring,
            "again@user.io",
            Category::Libido,
            &QuizResponses::new(),
            date!(2024 - 06 - 10),
        )
        .await
        .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(profile.dietary_preference, DietaryPreference::Vegan);
        assert_eq!(profile.category, Category::Libido);
        assert_eq!(profile.program_start, date!(2024 - 06 - 10));
        let latest = store.latest_quiz_result("again@user.io").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }
}
