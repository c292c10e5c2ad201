//! Rewrites a day of static meals for a dietary preference.
//!
//! Disallowed ingredients are swapped for the substitute from the rule table,
//! the meal's calories are recomputed as the exact sum of its ingredients and
//! protein/carbs/fats are shifted by the macro difference of each swap.
//! Unknown ingredients pass through unflagged.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::catalog::{self, CatalogEntry, Macros, Substitute};
use crate::content::{Ingredient, Meal};
use crate::program::types::DietaryPreference;

/// Foods with at least this much protein per 100 g are swapped protein-for-protein.
const PROTEIN_SOURCE_MIN: f64 = 5.0;
const PORTION_RATIO_MIN: f64 = 0.5;
const PORTION_RATIO_MAX: f64 = 1.5;
const GRAM_STEP: f64 = 5.0;
const FALLBACK_GRAMS: f64 = 100.0;

lazy_static! {
    static ref QUANTITY_RE: Regex =
        Regex::new(r"(?i)^\s*(\d+(?:[.,]\d+)?)\s*(kg|кг|g|гр|г|ml|мл|l|л)?\b").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutedIngredient {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    #[serde(default)]
    pub substituted: bool,
    /// Name from the static plan, kept across repeated passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// A meal after a substitution pass. Same shape for every preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutedMeal {
    pub meal_number: u32,
    pub time: String,
    pub name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
    pub ingredients: Vec<SubstitutedIngredient>,
    #[serde(default)]
    pub substitution_count: u32,
    #[serde(default)]
    pub name_updated: bool,
}

impl From<Meal> for SubstitutedMeal {
    fn from(meal: Meal) -> Self {
        Self {
            meal_number: meal.meal_number,
            time: meal.time,
            name: meal.name,
            calories: meal.calories,
            protein: meal.protein,
            carbs: meal.carbs,
            fats: meal.fats,
            ingredients: meal
                .ingredients
                .into_iter()
                .map(|ingredient| SubstitutedIngredient {
                    ingredient,
                    substituted: false,
                    original_name: None,
                })
                .collect(),
            substitution_count: 0,
            name_updated: false,
        }
    }
}

impl SubstitutedMeal {
    pub fn ingredient_calories(&self) -> u32 {
        self.ingredients
            .iter()
            .fold(0u32, |total, i| total.saturating_add(i.ingredient.calories))
    }

    /// Brings a meal from outside the engine (AI override) in line with the
    /// engine's invariants: calories equal the ingredient sum and
    /// `substitution_count > 0` exactly when an ingredient is flagged.
    pub fn normalized(mut self) -> Self {
        self.calories = self.ingredient_calories();
        let flagged = self.ingredients.iter().filter(|i| i.substituted).count() as u32;
        if flagged == 0 {
            self.substitution_count = 0;
        } else if self.substitution_count < flagged {
            self.substitution_count = flagged;
        }
        self
    }
}

/// Applies `preference` to every meal of a day. Source meals are not touched.
pub fn apply_day_substitutions(
    meals: &[Meal],
    preference: DietaryPreference,
) -> Vec<SubstitutedMeal> {
    meals
        .iter()
        .cloned()
        .map(|meal| substitute_meal(meal.into(), preference))
        .collect()
}

/// One substitution pass over a meal. Earlier flags are kept and the count only grows.
pub fn substitute_meal(mut meal: SubstitutedMeal, preference: DietaryPreference) -> SubstitutedMeal {
    if preference.is_default() {
        return meal;
    }

    let mut delta = Macros::default();
    let mut swapped: Vec<(&'static CatalogEntry, &'static Substitute)> = Vec::new();

    for item in meal.ingredients.iter_mut() {
        let Some(entry) = catalog::classify(&item.ingredient.name) else {
            continue;
        };
        let Some(substitute) = catalog::substitute_for(entry, preference) else {
            continue;
        };
        let swap = swap_ingredient(&item.ingredient, entry, substitute);
        delta += swap.added - swap.removed;
        if item.original_name.is_none() {
            item.original_name = Some(item.ingredient.name.clone());
        }
        item.ingredient = swap.ingredient;
        item.substituted = true;
        swapped.push((entry, substitute));
    }

    if swapped.is_empty() {
        return meal;
    }

    meal.substitution_count += swapped.len() as u32;
    meal.calories = meal.ingredient_calories();
    meal.protein = shift(meal.protein, delta.protein);
    meal.carbs = shift(meal.carbs, delta.carbs);
    meal.fats = shift(meal.fats, delta.fats);

    if let Some(renamed) = rename(&meal.name, &swapped) {
        meal.name = renamed;
        meal.name_updated = true;
    }
    meal
}

struct Swap {
    ingredient: Ingredient,
    removed: Macros,
    added: Macros,
}

fn swap_ingredient(original: &Ingredient, entry: &CatalogEntry, substitute: &Substitute) -> Swap {
    let grams = original_grams(original, entry);
    let removed = entry.per_100g.scaled(grams);

    let ratio = if entry.per_100g.protein >= PROTEIN_SOURCE_MIN && substitute.per_100g.protein > 0.0
    {
        entry.per_100g.protein / substitute.per_100g.protein
    } else {
        1.0
    };
    let new_grams = round_to_step(grams * ratio.clamp(PORTION_RATIO_MIN, PORTION_RATIO_MAX));
    let added = substitute.per_100g.scaled(new_grams);

    Swap {
        ingredient: Ingredient {
            name: substitute.name.to_string(),
            quantity: format_quantity(new_grams, substitute.liquid, &original.quantity),
            calories: added.kcal.round() as u32,
        },
        removed,
        added,
    }
}

/// Mass of the original ingredient. Calories are authoritative in the static
/// tables; the quantity text is only used when they are missing.
fn original_grams(ingredient: &Ingredient, entry: &CatalogEntry) -> f64 {
    if ingredient.calories > 0 && entry.per_100g.kcal > 0.0 {
        return f64::from(ingredient.calories) * 100.0 / entry.per_100g.kcal;
    }
    parse_grams(&ingredient.quantity).unwrap_or(FALLBACK_GRAMS)
}

fn parse_grams(quantity: &str) -> Option<f64> {
    let caps = QUANTITY_RE.captures(quantity)?;
    let value: f64 = caps[1].replace(',', ".").parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str().to_lowercase());
    match unit.as_deref() {
        Some("kg") | Some("кг") | Some("l") | Some("л") => Some(value * 1000.0),
        Some(_) => Some(value),
        None => None,
    }
}

fn round_to_step(grams: f64) -> f64 {
    ((grams / GRAM_STEP).round() * GRAM_STEP).max(GRAM_STEP)
}

fn format_quantity(grams: f64, liquid: bool, original: &str) -> String {
    let cyrillic = original
        .chars()
        .any(|c| matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'));
    let unit = match (liquid, cyrillic) {
        (true, true) => "мл",
        (true, false) => "ml",
        (false, true) => "г",
        (false, false) => "g",
    };
    format!("{}{}", grams as u32, unit)
}

fn shift(total: u32, delta: f64) -> u32 {
    (f64::from(total) + delta).round().max(0.0) as u32
}

/// Replaces mentions of the swapped products in a meal name, `None` if there are none.
///
/// All matches are taken from the name as it was before the pass, so a label
/// that itself contains a keyword ("soy yogurt") is never rewritten again.
fn rename(name: &str, swapped: &[(&'static CatalogEntry, &'static Substitute)]) -> Option<String> {
    let mut spans: Vec<(usize, usize, &'static str)> = Vec::new();
    for (entry, substitute) in swapped {
        let Some(pattern) = catalog::entry_pattern(entry) else {
            continue;
        };
        for m in pattern.find_iter(name) {
            let overlaps = spans
                .iter()
                .any(|&(start, end, _)| m.start() < end && start < m.end());
            if !overlaps {
                spans.push((m.start(), m.end(), substitute.label));
            }
        }
    }
    if spans.is_empty() {
        return None;
    }

    spans.sort_unstable_by_key(|&(start, _, _)| start);
    let mut renamed = String::with_capacity(name.len());
    let mut last = 0;
    for (start, end, label) in spans {
        renamed.push_str(&name[last..start]);
        renamed.push_str(&match_case(&name[start..end], label));
        last = end;
    }
    renamed.push_str(&name[last..]);
    Some(renamed)
}

fn match_case(matched: &str, label: &str) -> String {
    let capitalized = matched.chars().next().is_some_and(char::is_uppercase);
    if !capitalized {
        return label.to_string();
    }
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
