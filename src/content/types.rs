use serde::{Deserialize, Serialize};

/// One line of a static meal: name, free-text quantity ("150g", "2 pcs") and calories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
    pub calories: u32,
}

/// One eating occasion of a program day. Totals equal the sum of the ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_number: u32,
    pub time: String,
    pub name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub rest_sec: u32,
}

/// A day's training session. Rest days have no exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub title: String,
    pub focus: String,
    pub duration_min: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn is_rest_day(&self) -> bool {
        self.exercises.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplement {
    pub name: String,
    pub dose: String,
    pub timing: String,
}
