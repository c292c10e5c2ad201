pub mod handlers;
pub mod types;

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use axum::Router;
use serde::de::DeserializeOwned;

use crate::program::types::{Category, DayOfWeek, Level, WorkoutLocation};
use crate::state::AppState;

pub use types::{Ingredient, Meal, Supplement, Workout};

pub type WeeklyMeals = BTreeMap<DayOfWeek, Vec<Meal>>;
pub type WeeklyWorkouts = BTreeMap<DayOfWeek, Workout>;

type MealTable = BTreeMap<Category, BTreeMap<Level, WeeklyMeals>>;
type WorkoutTable = BTreeMap<Category, BTreeMap<Level, BTreeMap<WorkoutLocation, WeeklyWorkouts>>>;
type SupplementTable = BTreeMap<Category, Vec<Supplement>>;

const MEAL_PLANS_FILE: &str = "meal_plans.json";
const WORKOUT_PLANS_FILE: &str = "workout_plans.json";
const SUPPLEMENTS_FILE: &str = "supplements.json";

const EMBEDDED_MEAL_PLANS: &str = include_str!("../../data/meal_plans.json");
const EMBEDDED_WORKOUT_PLANS: &str = include_str!("../../data/workout_plans.json");
const EMBEDDED_SUPPLEMENTS: &str = include_str!("../../data/supplements.json");

pub fn router() -> Router<AppState> {
    handlers::plan_routes()
}

/// Pre-authored program content: meal plans per (category, level), workouts per
/// (category, level, location) and supplements per category.
///
/// Loading validates that every combination has all seven days, so the lookups
/// below never miss for a valid assignment.
#[derive(Debug, Clone)]
pub struct Content {
    meal_plans: MealTable,
    workout_plans: WorkoutTable,
    supplements: SupplementTable,
}

impl Content {
    /// Content compiled into the binary from `data/`.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_sources(
            EMBEDDED_MEAL_PLANS,
            EMBEDDED_WORKOUT_PLANS,
            EMBEDDED_SUPPLEMENTS,
        )
    }

    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
        };
        Self::from_sources(
            &read(MEAL_PLANS_FILE)?,
            &read(WORKOUT_PLANS_FILE)?,
            &read(SUPPLEMENTS_FILE)?,
        )
    }

    fn from_sources(meals: &str, workouts: &str, supplements: &str) -> anyhow::Result<Self> {
        let content = Self {
            meal_plans: parse(meals, MEAL_PLANS_FILE)?,
            workout_plans: parse(workouts, WORKOUT_PLANS_FILE)?,
            supplements: parse(supplements, SUPPLEMENTS_FILE)?,
        };
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for &category in Category::ALL {
            anyhow::ensure!(
                self.supplements.contains_key(&category),
                "no supplements for {category}"
            );
            for &level in Level::ALL {
                let meals = self
                    .meal_plan(category, level)
                    .with_context(|| format!("no meal plan for {category}/{level}"))?;
                for &day in DayOfWeek::ALL {
                    let day_meals = meals
                        .get(&day)
                        .with_context(|| format!("meal plan {category}/{level} misses {day}"))?;
                    validate_day(day_meals)
                        .with_context(|| format!("meal plan {category}/{level}/{day}"))?;
                }
                for &location in WorkoutLocation::ALL {
                    let workouts = self.workout_plan(category, level, location).with_context(
                        || format!("no workout plan for {category}/{level}/{location}"),
                    )?;
                    for &day in DayOfWeek::ALL {
                        anyhow::ensure!(
                            workouts.contains_key(&day),
                            "workout plan {category}/{level}/{location} misses {day}"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    pub fn meal_plan(&self, category: Category, level: Level) -> Option<&WeeklyMeals> {
        self.meal_plans.get(&category)?.get(&level)
    }

    /// Meals for one day in serving order. Empty for an unknown combination.
    pub fn meals_for(&self, category: Category, level: Level, day: DayOfWeek) -> &[Meal] {
        self.meal_plan(category, level)
            .and_then(|plan| plan.get(&day))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn workout_plan(
        &self,
        category: Category,
        level: Level,
        location: WorkoutLocation,
    ) -> Option<&WeeklyWorkouts> {
        self.workout_plans.get(&category)?.get(&level)?.get(&location)
    }

    pub fn workout_for(
        &self,
        category: Category,
        level: Level,
        location: WorkoutLocation,
        day: DayOfWeek,
    ) -> Option<&Workout> {
        self.workout_plan(category, level, location)?.get(&day)
    }

    pub fn supplements(&self, category: Category) -> &[Supplement] {
        self.supplements
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn parse<T: DeserializeOwned>(raw: &str, name: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).with_context(|| format!("parse {name}"))
}

fn validate_day(meals: &[Meal]) -> anyhow::Result<()> {
    anyhow::ensure!(!meals.is_empty(), "day has no meals");
    for (idx, meal) in meals.iter().enumerate() {
        anyhow::ensure!(
            meal.meal_number as usize == idx + 1,
            "meal numbers must run 1..N in order, found {} at position {}",
            meal.meal_number,
            idx + 1
        );
        let sum: u32 = meal.ingredients.iter().map(|i| i.calories).sum();
        anyhow::ensure!(
            sum == meal.calories,
            "meal {} calories {} != ingredient sum {}",
            meal.meal_number,
            meal.calories,
            sum
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_content_is_complete() {
        let content = Content::embedded().expect("embedded content should load");
        for &category in Category::ALL {
            assert!(!content.supplements(category).is_empty());
            for &level in Level::ALL {
                for &day in DayOfWeek::ALL {
                    assert!(!content.meals_for(category, level, day).is_empty());
                    for &location in WorkoutLocation::ALL {
                        assert!(content.workout_for(category, level, location, day).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn higher_levels_eat_more() {
        let content = Content::embedded().unwrap();
        let day_total = |level| -> u32 {
            content
                .meals_for(Category::Muscle, level, DayOfWeek::Monday)
                .iter()
                .map(|m| m.calories)
                .sum()
        };
        assert!(day_total(Level::Low) < day_total(Level::Normal));
        assert!(day_total(Level::Normal) < day_total(Level::High));
    }

    #[test]
    fn rejects_meal_whose_total_disagrees_with_ingredients() {
        let meals = vec![Meal {
            meal_number: 1,
            time: "08:00".into(),
            name: "Oatmeal".into(),
            calories: 500,
            protein: 10,
            carbs: 60,
            fats: 5,
            ingredients: vec![Ingredient {
                name: "Rolled oats".into(),
                quantity: "60g".into(),
                calories: 227,
            }],
        }];
        let err = validate_day(&meals).unwrap_err();
        assert!(err.to_string().contains("ingredient sum"));
    }

    #[test]
    fn rejects_out_of_order_meal_numbers() {
        let meal = |n| Meal {
            meal_number: n,
            time: String::new(),
            name: String::new(),
            calories: 0,
            protein: 0,
            carbs: 0,
            fats: 0,
            ingredients: Vec::new(),
        };
        assert!(validate_day(&[meal(1), meal(3)]).is_err());
        assert!(validate_day(&[meal(1), meal(2)]).is_ok());
        assert!(validate_day(&[]).is_err());
    }
}
