use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::Date;

use super::substitution::{apply_day_substitutions, substitute_meal, SubstitutedMeal};
use crate::content::{Content, Ingredient, Meal};
use crate::program::types::{DayOfWeek, DietaryPreference};
use crate::records::{DayLog, Profile, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    Plan,
    AiOverride,
}

/// A meal as shown for one date: plan or override, with its completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMeal {
    #[serde(flatten)]
    pub meal: SubstitutedMeal,
    pub source: MealSource,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NutritionTotals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl NutritionTotals {
    fn add(&mut self, meal: &SubstitutedMeal) {
        self.calories = self.calories.saturating_add(meal.calories);
        self.protein = self.protein.saturating_add(meal.protein);
        self.carbs = self.carbs.saturating_add(meal.carbs);
        self.fats = self.fats.saturating_add(meal.fats);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayNutrition {
    pub planned: NutritionTotals,
    pub consumed: NutritionTotals,
}

/// Upper bound for one ingredient and for a whole meal supplied from outside
/// the static plans.
pub const MAX_MEAL_CALORIES: u32 = 10_000;

/// `false` when an ingredient or the meal total exceeds [`MAX_MEAL_CALORIES`].
pub fn calories_plausible<'a>(ingredients: impl IntoIterator<Item = &'a Ingredient>) -> bool {
    let mut total = 0u32;
    for ingredient in ingredients {
        if ingredient.calories > MAX_MEAL_CALORIES {
            return false;
        }
        total = total.saturating_add(ingredient.calories);
    }
    total <= MAX_MEAL_CALORIES
}

/// Static plan meals under the user's preference.
pub fn plan_day(plan: &[Meal], preference: DietaryPreference) -> Vec<SubstitutedMeal> {
    if preference.is_default() {
        plan.iter().cloned().map(SubstitutedMeal::from).collect()
    } else {
        apply_day_substitutions(plan, preference)
    }
}

/// Overrides replace plan meals with the same meal number; the rest of the
/// plan is kept. Output is ordered by meal number.
pub fn merge_day(
    planned: Vec<SubstitutedMeal>,
    overrides: Vec<SubstitutedMeal>,
    completed: &BTreeSet<u32>,
) -> Vec<PlannedMeal> {
    let mut by_number: BTreeMap<u32, (SubstitutedMeal, MealSource)> = planned
        .into_iter()
        .map(|meal| (meal.meal_number, (meal, MealSource::Plan)))
        .collect();
    for meal in overrides {
        by_number.insert(meal.meal_number, (meal, MealSource::AiOverride));
    }
    by_number
        .into_values()
        .map(|(meal, source)| PlannedMeal {
            completed: completed.contains(&meal.meal_number),
            meal,
            source,
        })
        .collect()
}

pub fn day_nutrition(meals: &[PlannedMeal]) -> DayNutrition {
    let mut totals = DayNutrition::default();
    for planned in meals {
        totals.planned.add(&planned.meal);
        if planned.completed {
            totals.consumed.add(&planned.meal);
        }
    }
    totals
}

/// Brings a user or AI supplied meal in line with the preference and the
/// calorie invariant before it is stored.
pub fn prepare_override(meal: SubstitutedMeal, preference: DietaryPreference) -> SubstitutedMeal {
    substitute_meal(meal, preference).normalized()
}

pub async fn load_day_meals(
    content: &Content,
    records: &dyn RecordStore,
    profile: &Profile,
    day: Date,
    log: &DayLog,
) -> anyhow::Result<Vec<PlannedMeal>> {
    let plan = content.meals_for(profile.category, profile.level, DayOfWeek::from(day));
    let overrides = records.meal_overrides(&profile.email, day).await?;
    Ok(merge_day(
        plan_day(plan, profile.dietary_preference),
        overrides,
        &log.completed_meals,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(meal_number: u32, name: &str, ingredient: &str, calories: u32) -> Meal {
        Meal {
            meal_number,
            time: format!("{:02}:00", 7 + meal_number * 3),
            name: name.into(),
            calories,
            protein: 20,
            carbs: 30,
            fats: 10,
            ingredients: vec![Ingredient {
                name: ingredient.into(),
                quantity: "100g".into(),
                calories,
            }],
        }
    }

    fn day() -> Vec<Meal> {
        vec![
            meal(1, "Oatmeal", "Rolled oats", 300),
            meal(2, "Chicken salad", "Chicken breast", 165),
            meal(3, "Rice bowl", "Brown rice", 250),
        ]
    }

    #[test]
    fn omnivor_keeps_plan_untouched() {
        let planned = plan_day(&day(), DietaryPreference::Omnivor);
        assert_eq!(planned.len(), 3);
        assert!(planned.iter().all(|m| m.substitution_count == 0));
        assert_eq!(planned[1].name, "Chicken salad");
    }

    #[test]
    fn vegetarian_plan_is_substituted() {
        let planned = plan_day(&day(), DietaryPreference::Vegetarian);
        assert_eq!(planned[1].substitution_count, 1);
        assert!(planned[1].ingredients[0].substituted);
        assert_eq!(planned[0].substitution_count, 0);
    }

    #[test]
    fn override_replaces_same_meal_number_only() {
        let planned = plan_day(&day(), DietaryPreference::Omnivor);
        let mut custom = SubstitutedMeal::from(meal(2, "Lentil soup", "Red lentils", 230));
        custom.ingredients[0].substituted = true;
        let merged = merge_day(planned, vec![custom.normalized()], &BTreeSet::from([2, 3]));

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].source, MealSource::Plan);
        assert_eq!(merged[1].source, MealSource::AiOverride);
        assert_eq!(merged[1].meal.name, "Lentil soup");
        assert_eq!(merged[1].meal.substitution_count, 1);
        assert!(!merged[0].completed);
        assert!(merged[1].completed && merged[2].completed);

        let totals = day_nutrition(&merged);
        assert_eq!(totals.planned.calories, 300 + 230 + 250);
        assert_eq!(totals.consumed.calories, 230 + 250);
    }

    #[test]
    fn oversized_calories_are_implausible() {
        let item = |calories| Ingredient {
            name: "Rolled oats".into(),
            quantity: "80g".into(),
            calories,
        };
        assert!(calories_plausible(&[item(303), item(105)]));
        assert!(calories_plausible(&[item(MAX_MEAL_CALORIES)]));
        assert!(!calories_plausible(&[item(MAX_MEAL_CALORIES + 1)]));
        assert!(!calories_plausible(&[item(6_000), item(6_000)]));
        assert!(!calories_plausible(&[item(3_000_000_000), item(3_000_000_000)]));
    }

    #[test]
    fn huge_totals_saturate_instead_of_overflowing() {
        let mut big = SubstitutedMeal::from(meal(1, "Feast", "Rolled oats", 3_000_000_000));
        big.ingredients.push(big.ingredients[0].clone());
        let big = big.normalized();
        assert_eq!(big.calories, u32::MAX);

        let merged = merge_day(vec![big.clone()], Vec::new(), &BTreeSet::from([1]));
        let totals = day_nutrition(&merged);
        assert_eq!(totals.planned.calories, u32::MAX);
        assert_eq!(totals.consumed.calories, u32::MAX);
    }

    #[test]
    fn prepared_override_follows_preference_and_sum() {
        let mut raw = SubstitutedMeal::from(meal(1, "Tuna toast", "Tuna", 130));
        raw.calories = 999;
        let prepared = prepare_override(raw, DietaryPreference::Vegan);
        assert_eq!(prepared.calories, prepared.ingredient_calories());
        assert!(prepared.ingredients[0].substituted);
        assert_eq!(prepared.substitution_count, 1);
    }
}
