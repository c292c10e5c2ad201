use serde::Serialize;
use time::Date;

use super::types::{DayOfWeek, DietaryPreference, Level, ProgramAssignment, WorkoutLocation};
use crate::content::{Content, Supplement, Workout};
use crate::meals::services::{day_nutrition, load_day_meals, DayNutrition, PlannedMeal};
use crate::records::{Profile, RecordStore};

pub const PROGRAM_DAYS: u32 = 30;

/// 1-based day of the program on `today`, clamped to `1..=PROGRAM_DAYS`.
pub fn program_day(start: Date, today: Date) -> u32 {
    let day = (today - start).whole_days() + 1;
    day.clamp(1, i64::from(PROGRAM_DAYS)) as u32
}

/// Level and location may change mid-program; the category may not.
pub fn change_program(profile: &mut Profile, level: Option<Level>, location: Option<WorkoutLocation>) {
    if let Some(level) = level {
        profile.level = level;
    }
    if let Some(location) = location {
        profile.workout_location = location;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutOfDay {
    #[serde(flatten)]
    pub workout: Workout,
    pub rest_day: bool,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplementOfDay {
    #[serde(flatten)]
    pub supplement: Supplement,
    pub taken: bool,
}

/// Everything the app shows for one user on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: Date,
    pub program_day: u32,
    pub program_days: u32,
    pub day_of_week: DayOfWeek,
    pub program: ProgramAssignment,
    pub dietary_preference: DietaryPreference,
    pub meals: Vec<PlannedMeal>,
    pub nutrition: DayNutrition,
    pub workout: Option<WorkoutOfDay>,
    pub sleep_hours: Option<f64>,
    pub supplements: Vec<SupplementOfDay>,
}

pub async fn build_dashboard(
    content: &Content,
    records: &dyn RecordStore,
    profile: &Profile,
    day: Date,
) -> anyhow::Result<Dashboard> {
    let log = records.day_log(&profile.email, day).await?;
    let meals = load_day_meals(content, records, profile, day, &log).await?;
    let day_of_week = DayOfWeek::from(day);

    let workout = content
        .workout_for(profile.category, profile.level, profile.workout_location, day_of_week)
        .cloned()
        .map(|workout| WorkoutOfDay {
            rest_day: workout.is_rest_day(),
            done: log.workout_done,
            workout,
        });
    let supplements = content
        .supplements(profile.category)
        .iter()
        .cloned()
        .map(|supplement| SupplementOfDay {
            taken: log.supplements_taken.contains(&supplement.name),
            supplement,
        })
        .collect();

    Ok(Dashboard {
        date: day,
        program_day: program_day(profile.program_start, day),
        program_days: PROGRAM_DAYS,
        day_of_week,
        program: profile.assignment(),
        dietary_preference: profile.dietary_preference,
        nutrition: day_nutrition(&meals),
        meals,
        workout,
        sleep_hours: log.sleep_hours,
        supplements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::services::MealSource;
    use crate::program::types::Category;
    use crate::records::MemoryRecords;
    use time::macros::date;

    fn profile(preference: DietaryPreference) -> Profile {
        Profile {
            email: "dash@test.io".into(),
            category: Category::Muscle,
            level: Level::Normal,
            workout_location: WorkoutLocation::Gym,
            dietary_preference: preference,
            program_start: date!(2024 - 01 - 01),
        }
    }

    #[test]
    fn program_day_is_clamped() {
        let start = date!(2024 - 01 - 01);
        assert_eq!(program_day(start, start), 1);
        assert_eq!(program_day(start, date!(2024 - 01 - 10)), 10);
        assert_eq!(program_day(start, date!(2023 - 12 - 25)), 1);
        assert_eq!(program_day(start, date!(2024 - 03 - 01)), PROGRAM_DAYS);
    }

    #[test]
    fn program_change_keeps_category() {
        let mut p = profile(DietaryPreference::Omnivor);
        change_program(&mut p, Some(Level::High), None);
        assert_eq!(p.level, Level::High);
        assert_eq!(p.workout_location, WorkoutLocation::Gym);
        assert_eq!(p.category, Category::Muscle);
    }

    #[tokio::test]
    async fn dashboard_reflects_tracking() {
        let content = Content::embedded().unwrap();
        let records = MemoryRecords::new();
        let p = profile(DietaryPreference::Omnivor);
        let day = date!(2024 - 01 - 03);

        records.toggle_meal(&p.email, day, 1).await.unwrap();
        records.toggle_workout(&p.email, day).await.unwrap();
        records.set_sleep(&p.email, day, 7.5).await.unwrap();
        let first_supplement = content.supplements(Category::Muscle)[0].name.clone();
        records
            .toggle_supplement(&p.email, day, &first_supplement)
            .await
            .unwrap();

        let dash = build_dashboard(&content, &records, &p, day).await.unwrap();
        assert_eq!(dash.program_day, 3);
        assert_eq!(dash.day_of_week, DayOfWeek::Wednesday);
        assert!(dash.meals[0].completed);
        assert!(dash.meals.iter().skip(1).all(|m| !m.completed));
        assert_eq!(dash.nutrition.consumed.calories, dash.meals[0].meal.calories);
        assert!(dash.nutrition.planned.calories > dash.nutrition.consumed.calories);
        assert!(dash.workout.as_ref().unwrap().done);
        assert_eq!(dash.sleep_hours, Some(7.5));
        assert!(dash.supplements[0].taken);
    }

    #[tokio::test]
    async fn dashboard_applies_preference_and_overrides() {
        let content = Content::embedded().unwrap();
        let records = MemoryRecords::new();
        let p = profile(DietaryPreference::Vegan);
        let day = date!(2024 - 01 - 01);

        let vegan = build_dashboard(&content, &records, &p, day).await.unwrap();
        for planned in &vegan.meals {
            assert_eq!(planned.meal.calories, planned.meal.ingredient_calories());
        }
        assert!(vegan.meals.iter().any(|m| m.meal.substitution_count > 0));

        let mut custom = vegan.meals[1].meal.clone();
        custom.name = "Custom lunch".into();
        records.set_meal_override(&p.email, day, &custom).await.unwrap();
        let dash = build_dashboard(&content, &records, &p, day).await.unwrap();
        assert_eq!(dash.meals.len(), vegan.meals.len());
        assert_eq!(dash.meals[1].source, MealSource::AiOverride);
        assert_eq!(dash.meals[1].meal.name, "Custom lunch");
    }
}
