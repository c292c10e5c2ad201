use serde::Deserialize;

use super::substitution::SubstitutedMeal;

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    /// `YYYY-MM-DD`; today when absent.
    #[serde(default)]
    pub date: Option<String>,
    pub meal: SubstitutedMeal,
}

#[derive(Debug, Deserialize)]
pub struct AiSwapRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub meal_number: u32,
    /// Free-text wish passed to the model ("no mushrooms").
    #[serde(default)]
    pub wish: Option<String>,
}
