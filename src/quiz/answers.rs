//! Quiz answers and the closed option sets used by option questions.
//!
//! The quiz page sends option identifiers. Identifiers are compared exactly
//! after normalisation (`"Non-smoker"` → `non_smoker`); older clients that
//! still send the option label are covered by the alias lists.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::program::types::WorkoutLocation;

lazy_static! {
    static ref LEADING_NUMBER_RE: Regex = Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").unwrap();
}

/// Raw answer value: a scale/number or an option identifier / free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

/// Question id → answer. Ordered so every pass over it is deterministic.
pub type QuizResponses = BTreeMap<String, Answer>;

impl Answer {
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Number(n) => !n.is_finite(),
            Answer::Text(t) => t.trim().is_empty(),
        }
    }

    /// Numeric value; text answers like `"7"` or `"7-8 hours"` read their leading number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) if n.is_finite() => Some(*n),
            Answer::Number(_) => None,
            Answer::Text(t) => LEADING_NUMBER_RE
                .captures(t)
                .and_then(|caps| caps[1].replace(',', ".").parse().ok()),
        }
    }

    pub fn as_option<T: AnswerOption>(&self) -> Option<T> {
        match self {
            Answer::Text(t) => T::parse(t),
            Answer::Number(_) => None,
        }
    }
}

/// Lowercase, spaces and hyphens folded to `_`, apostrophes dropped.
pub fn normalize_option(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['\'', '’'], "")
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Closed set of identifiers for one option question.
pub trait AnswerOption: Sized + Copy + 'static {
    const OPTIONS: &'static [(Self, &'static [&'static str])];

    fn parse(raw: &str) -> Option<Self> {
        let key = normalize_option(raw);
        Self::OPTIONS
            .iter()
            .find(|(_, ids)| ids.contains(&key.as_str()))
            .map(|(option, _)| *option)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionQuality {
    Balanced,
    Average,
    Poor,
}

impl AnswerOption for NutritionQuality {
    const OPTIONS: &'static [(Self, &'static [&'static str])] = &[
        (
            NutritionQuality::Balanced,
            &["balanced", "balanced_diet", "healthy", "healthy_diet", "mostly_healthy"],
        ),
        (
            NutritionQuality::Average,
            &["average", "average_diet", "mixed", "sometimes_healthy"],
        ),
        (
            NutritionQuality::Poor,
            &["poor", "unhealthy", "fast_food", "irregular", "mostly_unhealthy"],
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokingFrequency {
    Never,
    Occasionally,
    Daily,
}

impl AnswerOption for SmokingFrequency {
    const OPTIONS: &'static [(Self, &'static [&'static str])] = &[
        (
            SmokingFrequency::Never,
            &["never", "non_smoker", "nonsmoker", "no", "dont_smoke", "quit"],
        ),
        (
            SmokingFrequency::Occasionally,
            &["occasionally", "sometimes", "social", "social_smoker"],
        ),
        (
            SmokingFrequency::Daily,
            &["daily", "regularly", "yes", "smoker", "every_day"],
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlcoholFrequency {
    Never,
    Rarely,
    Weekly,
    Daily,
}

impl AnswerOption for AlcoholFrequency {
    const OPTIONS: &'static [(Self, &'static [&'static str])] = &[
        (
            AlcoholFrequency::Never,
            &["never", "no", "dont_drink", "non_drinker"],
        ),
        (AlcoholFrequency::Rarely, &["rarely", "rare", "monthly"]),
        (
            AlcoholFrequency::Weekly,
            &["weekly", "occasionally", "sometimes", "weekends"],
        ),
        (
            AlcoholFrequency::Daily,
            &["daily", "often", "every_day", "frequently"],
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingExperience {
    None,
    Beginner,
    Intermediate,
    Advanced,
}

impl AnswerOption for TrainingExperience {
    const OPTIONS: &'static [(Self, &'static [&'static str])] = &[
        (
            TrainingExperience::None,
            &["none", "never", "no_experience"],
        ),
        (
            TrainingExperience::Beginner,
            &["beginner", "novice", "less_than_year"],
        ),
        (
            TrainingExperience::Intermediate,
            &["intermediate", "one_to_three_years"],
        ),
        (
            TrainingExperience::Advanced,
            &["advanced", "expert", "more_than_three_years"],
        ),
    ];
}

impl AnswerOption for WorkoutLocation {
    const OPTIONS: &'static [(Self, &'static [&'static str])] = &[
        (WorkoutLocation::Home, &["home", "at_home"]),
        (WorkoutLocation::Gym, &["gym", "fitness_club"]),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numbers_and_text() {
        let raw = r#"{"ene_q1": 8, "ene_q11": "balanced diet", "ene_q14": "7.5"}"#;
        let responses: QuizResponses = serde_json::from_str(raw).unwrap();
        assert_eq!(responses["ene_q1"], Answer::Number(8.0));
        assert_eq!(responses["ene_q11"], Answer::Text("balanced diet".into()));
        assert_eq!(responses["ene_q14"].as_number(), Some(7.5));
    }

    #[test]
    fn options_match_exact_identifiers_only() {
        assert_eq!(
            Answer::Text("Balanced diet".into()).as_option(),
            Some(NutritionQuality::Balanced)
        );
        assert_eq!(
            Answer::Text("non-smoker".into()).as_option(),
            Some(SmokingFrequency::Never)
        );
        assert_eq!(
            Answer::Text("I don't smoke".into()).as_option::<SmokingFrequency>(),
            None
        );
        // "unbalanced" contains "balanced" but is not an identifier.
        assert_eq!(
            Answer::Text("unbalanced".into()).as_option::<NutritionQuality>(),
            None
        );
        assert_eq!(Answer::Number(2.0).as_option::<AlcoholFrequency>(), None);
    }

    #[test]
    fn normalisation() {
        assert_eq!(normalize_option("  Don't  Drink "), "dont_drink");
        assert_eq!(normalize_option("ONE-to-three years"), "one_to_three_years");
    }

    #[test]
    fn numbers_from_text() {
        assert_eq!(Answer::Text("7-8 hours".into()).as_number(), Some(7.0));
        assert_eq!(Answer::Text("6,5".into()).as_number(), Some(6.5));
        assert_eq!(Answer::Text("plenty".into()).as_number(), None);
        assert!(Answer::Text("   ".into()).is_blank());
    }
}
