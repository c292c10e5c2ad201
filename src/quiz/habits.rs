use serde::{Deserialize, Serialize};

use super::answers::{AlcoholFrequency, Answer, NutritionQuality, QuizResponses, SmokingFrequency};
use super::scoring::{answered_slots, slot_answer};
use crate::program::types::Category;

/// Question slots the classifier reads.
pub const NUTRITION_SLOT: u8 = 11;
pub const SMOKING_SLOT: u8 = 12;
pub const ALCOHOL_SLOT: u8 = 13;
pub const SLEEP_SLOT: u8 = 14;

/// Fewer answered questions of the category than this and the quiz is too
/// early to judge. Keys of other categories and unknown slots do not count.
pub const MIN_RESPONSES: usize = 5;

const HEALTHY_FROM: f64 = 1.5;
const AVERAGE_FROM: f64 = 0.8;

/// Selects the copy variant shown on the dynamic quiz questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitCondition {
    HealthyHabits,
    #[default]
    AverageHabits,
    UnhealthyHabits,
}

/// Averages the 0..2 points of the lifestyle questions that were answered.
pub fn classify_habits(responses: &QuizResponses, category: Category) -> HabitCondition {
    if answered_slots(responses, category) < MIN_RESPONSES {
        return HabitCondition::default();
    }

    let points: Vec<u8> = [
        slot_answer(responses, category, NUTRITION_SLOT).map(nutrition_points),
        slot_answer(responses, category, SMOKING_SLOT).map(smoking_points),
        slot_answer(responses, category, ALCOHOL_SLOT).map(alcohol_points),
        slot_answer(responses, category, SLEEP_SLOT).map(sleep_points),
    ]
    .into_iter()
    .flatten()
    .collect();

    if points.is_empty() {
        return HabitCondition::default();
    }

    let avg = points.iter().map(|&p| f64::from(p)).sum::<f64>() / points.len() as f64;
    if avg >= HEALTHY_FROM {
        HabitCondition::HealthyHabits
    } else if avg >= AVERAGE_FROM {
        HabitCondition::AverageHabits
    } else {
        HabitCondition::UnhealthyHabits
    }
}

fn nutrition_points(answer: &Answer) -> u8 {
    match answer.as_option() {
        Some(NutritionQuality::Balanced) => 2,
        Some(NutritionQuality::Average) => 1,
        _ => 0,
    }
}

fn smoking_points(answer: &Answer) -> u8 {
    match answer.as_option() {
        Some(SmokingFrequency::Never) => 2,
        Some(SmokingFrequency::Occasionally) => 1,
        _ => 0,
    }
}

fn alcohol_points(answer: &Answer) -> u8 {
    match answer.as_option() {
        Some(AlcoholFrequency::Never | AlcoholFrequency::Rarely) => 2,
        Some(AlcoholFrequency::Weekly) => 1,
        _ => 0,
    }
}

fn sleep_points(answer: &Answer) -> u8 {
    match answer.as_number() {
        Some(hours) if hours >= 7.0 => 2,
        Some(hours) if hours >= 6.0 => 1,
        _ => 0,
    }
}
