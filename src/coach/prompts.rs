use serde::Deserialize;

use super::client::CoachError;
use crate::content::Ingredient;
use crate::meals::services::{calories_plausible, MAX_MEAL_CALORIES};
use crate::meals::substitution::SubstitutedMeal;
use crate::program::types::{Category, DietaryPreference};
use crate::records::Profile;

const BASE_PROMPT: &str = "You are a friendly health coach inside a 30-day wellness program. \
Answer briefly and practically. You do not diagnose or prescribe medication; \
suggest seeing a doctor when symptoms sound serious.";

fn category_focus(category: Category) -> &'static str {
    match category {
        Category::Energy => {
            "The user follows the energy program: steady blood sugar, sleep quality, \
             hydration and moderate training against fatigue."
        }
        Category::Libido => {
            "The user follows the libido program: hormonal health, stress reduction, \
             zinc and healthy fats, strength training and recovery."
        }
        Category::Muscle => {
            "The user follows the muscle program: progressive overload, enough protein \
             on every meal, recovery and sleep."
        }
    }
}

fn preference_rule(preference: DietaryPreference) -> &'static str {
    match preference {
        DietaryPreference::Omnivor => "The user eats everything.",
        DietaryPreference::Pescatarian => "The user eats no meat but eats fish and seafood.",
        DietaryPreference::Vegetarian => "The user eats no meat, fish or seafood.",
        DietaryPreference::Vegan => "The user eats no animal products at all, including eggs, dairy and honey.",
    }
}

pub fn system_prompt(profile: Option<&Profile>) -> String {
    match profile {
        Some(p) => format!(
            "{BASE_PROMPT}\n{}\nProgram level: {}. Workouts at: {}.\n{}",
            category_focus(p.category),
            p.level,
            p.workout_location,
            preference_rule(p.dietary_preference),
        ),
        None => BASE_PROMPT.to_string(),
    }
}

/// Asks for a replacement of `meal` with similar calories, as bare JSON.
pub fn meal_swap_prompt(
    meal: &SubstitutedMeal,
    preference: DietaryPreference,
    wish: Option<&str>,
) -> String {
    let ingredients = meal
        .ingredients
        .iter()
        .map(|i| {
            format!(
                "- {} ({}, {} kcal)",
                i.ingredient.name, i.ingredient.quantity, i.ingredient.calories
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let wish = wish
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| format!("\nThe user asks: {w}"))
        .unwrap_or_default();

    format!(
        "Suggest one replacement for this meal.\n\
         Meal: {name} at {time}, {calories} kcal, protein {protein} g, carbs {carbs} g, fats {fats} g.\n\
         Ingredients:\n{ingredients}\n\
         {rule}{wish}\n\
         Keep the calories within 10% and the protein close. \
         Reply with JSON only, no prose, in this shape:\n\
         {{\"name\": string, \"protein\": number, \"carbs\": number, \"fats\": number, \
         \"ingredients\": [{{\"name\": string, \"quantity\": string, \"calories\": number}}]}}",
        name = meal.name,
        time = meal.time,
        calories = meal.calories,
        protein = meal.protein,
        carbs = meal.carbs,
        fats = meal.fats,
        rule = preference_rule(preference),
    )
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MealReply {
    pub name: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
    pub ingredients: Vec<Ingredient>,
}

/// Reads the first JSON object in a model reply, tolerating code fences and prose.
pub fn parse_meal_reply(raw: &str) -> Result<MealReply, CoachError> {
    let start = raw
        .find('{')
        .ok_or_else(|| CoachError::InvalidReply("no JSON object in reply".into()))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| CoachError::InvalidReply("unterminated JSON object".into()))?;
    let reply: MealReply = serde_json::from_str(&raw[start..=end])
        .map_err(|e| CoachError::InvalidReply(e.to_string()))?;

    if reply.name.trim().is_empty() {
        return Err(CoachError::InvalidReply("meal without a name".into()));
    }
    if reply.ingredients.is_empty() {
        return Err(CoachError::InvalidReply("meal without ingredients".into()));
    }
    if !calories_plausible(&reply.ingredients) {
        return Err(CoachError::InvalidReply(format!(
            "meal calories above {MAX_MEAL_CALORIES} kcal"
        )));
    }
    Ok(reply)
}
