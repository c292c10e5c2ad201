//! Quiz scoring.
//!
//! Every question id is `<prefix>_q<N>`; the slot `N` fixes the question's
//! meaning and section for all categories. Each answered question yields
//! "need" points (more symptoms or worse habits ⇒ more points). A section's
//! score is `100 * points / max points` over all of its questions, so an
//! unanswered question simply adds nothing. The total is the weighted mean of
//! the five sections and always lies in `[0, 100]`.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::answers::{
    AlcoholFrequency, Answer, NutritionQuality, QuizResponses, SmokingFrequency,
    TrainingExperience,
};
use super::habits::{classify_habits, HabitCondition};
use crate::program::types::{Category, Level, WorkoutLocation};

pub const LOCATION_SLOT: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Symptoms,
    Nutrition,
    Training,
    SleepRecovery,
    Context,
}

#[derive(Debug, Clone, Copy)]
enum Rubric {
    /// 0..=max severity scale.
    Scale,
    Age,
    /// Reads weight (this slot, kg) and height (next slot, cm).
    Bmi,
    /// Height is consumed by `Bmi`.
    Height,
    SessionsPerWeek,
    Experience,
    Nutrition,
    MealsPerDay,
    Water,
    Smoking,
    Alcohol,
    SleepHours,
    /// Collected for program assignment only.
    Unscored,
}

#[derive(Debug, Clone, Copy)]
struct Question {
    slot: u8,
    section: Section,
    rubric: Rubric,
    max: f64,
}

const fn q(slot: u8, section: Section, rubric: Rubric, max: f64) -> Question {
    Question {
        slot,
        section,
        rubric,
        max,
    }
}

static QUESTIONS: &[Question] = &[
    q(1, Section::Symptoms, Rubric::Scale, 10.0),
    q(2, Section::Symptoms, Rubric::Scale, 10.0),
    q(3, Section::Symptoms, Rubric::Scale, 10.0),
    q(4, Section::Symptoms, Rubric::Scale, 10.0),
    q(5, Section::Symptoms, Rubric::Scale, 10.0),
    q(6, Section::Context, Rubric::Age, 3.0),
    q(7, Section::Context, Rubric::Bmi, 3.0),
    q(8, Section::Context, Rubric::Height, 0.0),
    q(9, Section::Training, Rubric::SessionsPerWeek, 4.0),
    q(10, Section::Training, Rubric::Experience, 3.0),
    q(11, Section::Nutrition, Rubric::Nutrition, 3.0),
    q(12, Section::SleepRecovery, Rubric::Smoking, 3.0),
    q(13, Section::SleepRecovery, Rubric::Alcohol, 3.0),
    q(14, Section::SleepRecovery, Rubric::SleepHours, 4.0),
    q(15, Section::Nutrition, Rubric::MealsPerDay, 2.0),
    q(16, Section::Nutrition, Rubric::Water, 2.0),
    q(17, Section::SleepRecovery, Rubric::Scale, 10.0),
    q(LOCATION_SLOT, Section::Context, Rubric::Unscored, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionWeights {
    pub symptoms: f64,
    pub nutrition: f64,
    pub training: f64,
    pub sleep_recovery: f64,
    pub context: f64,
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            symptoms: 0.35,
            nutrition: 0.2,
            training: 0.15,
            sleep_recovery: 0.2,
            context: 0.1,
        }
    }
}

impl SectionWeights {
    fn get(&self, section: Section) -> f64 {
        match section {
            Section::Symptoms => self.symptoms,
            Section::Nutrition => self.nutrition,
            Section::Training => self.training,
            Section::SleepRecovery => self.sleep_recovery,
            Section::Context => self.context,
        }
    }
}

/// How the total maps onto a level for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelDirection {
    /// Higher need ⇒ higher level.
    Ascending,
    /// Higher need ⇒ lower level.
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub low_below: f64,
    pub high_from: f64,
    pub direction: LevelDirection,
}

impl LevelThresholds {
    pub fn level_for(&self, total: f64) -> Level {
        let band = if total < self.low_below {
            Level::Low
        } else if total >= self.high_from {
            Level::High
        } else {
            Level::Normal
        };
        match (self.direction, band) {
            (LevelDirection::Ascending, band) => band,
            (LevelDirection::Descending, Level::Low) => Level::High,
            (LevelDirection::Descending, Level::High) => Level::Low,
            (LevelDirection::Descending, Level::Normal) => Level::Normal,
        }
    }
}

/// Calibration constants: section weights and per-category level cut points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: SectionWeights,
    #[serde(default = "default_levels")]
    pub levels: BTreeMap<Category, LevelThresholds>,
}

fn default_levels() -> BTreeMap<Category, LevelThresholds> {
    // Energy and libido: the level is how much intervention the user gets.
    // Muscle: the level is training intensity, so a weak baseline starts low.
    let thresholds = |direction| LevelThresholds {
        low_below: 35.0,
        high_from: 65.0,
        direction,
    };
    BTreeMap::from([
        (Category::Energy, thresholds(LevelDirection::Ascending)),
        (Category::Libido, thresholds(LevelDirection::Ascending)),
        (Category::Muscle, thresholds(LevelDirection::Descending)),
    ])
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: SectionWeights::default(),
            levels: default_levels(),
        }
    }
}

impl ScoringConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read scoring config {}", path.display()))?;
        let mut config: ScoringConfig =
            serde_json::from_str(&raw).context("parse scoring config")?;
        for (category, thresholds) in default_levels() {
            config.levels.entry(category).or_insert(thresholds);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.weights;
        let weights = [w.symptoms, w.nutrition, w.training, w.sleep_recovery, w.context];
        anyhow::ensure!(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "section weights must be non-negative"
        );
        anyhow::ensure!(weights.iter().sum::<f64>() > 0.0, "section weights sum to zero");
        for (category, t) in &self.levels {
            anyhow::ensure!(
                t.low_below <= t.high_from,
                "{category}: low_below {} > high_from {}",
                t.low_below,
                t.high_from
            );
        }
        Ok(())
    }

    fn thresholds(&self, category: Category) -> LevelThresholds {
        self.levels
            .get(&category)
            .copied()
            .or_else(|| default_levels().get(&category).copied())
            .unwrap_or(LevelThresholds {
                low_below: 35.0,
                high_from: 65.0,
                direction: LevelDirection::Ascending,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub symptoms: f64,
    pub nutrition: f64,
    pub training: f64,
    pub sleep_recovery: f64,
    pub context: f64,
}

impl SectionScores {
    fn set(&mut self, section: Section, value: f64) {
        match section {
            Section::Symptoms => self.symptoms = value,
            Section::Nutrition => self.nutrition = value,
            Section::Training => self.training = value,
            Section::SleepRecovery => self.sleep_recovery = value,
            Section::Context => self.context = value,
        }
    }
}

/// Outcome of a completed quiz. Never mutated; a retake produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizScoreResult {
    pub category: Category,
    pub total: f64,
    pub sections: SectionScores,
    pub level: Level,
    pub workout_location: WorkoutLocation,
    pub habit_condition: HabitCondition,
    /// Recognised, non-blank answers for this category.
    pub answered: u32,
}

/// Answer stored under `<prefix>_q<slot>` for this category, if not blank.
pub(crate) fn slot_answer<'a>(
    responses: &'a QuizResponses,
    category: Category,
    slot: u8,
) -> Option<&'a Answer> {
    let key = format!("{}_q{}", category.question_prefix(), slot);
    responses.get(&key).filter(|answer| !answer.is_blank())
}

/// Number of this category's question slots with a non-blank answer.
pub(crate) fn answered_slots(responses: &QuizResponses, category: Category) -> usize {
    QUESTIONS
        .iter()
        .filter(|q| slot_answer(responses, category, q.slot).is_some())
        .count()
}

/// Scores a quiz. Pure: identical input gives identical output, and missing
/// or unreadable answers count as zero instead of failing.
pub fn calculate_quiz_score(
    responses: &QuizResponses,
    category: Category,
    config: &ScoringConfig,
) -> QuizScoreResult {
    let mut points: BTreeMap<Section, (f64, f64)> = BTreeMap::new();
    let mut answered = 0u32;

    for question in QUESTIONS {
        let entry = points.entry(question.section).or_insert((0.0, 0.0));
        entry.1 += question.max;
        let Some(answer) = slot_answer(responses, category, question.slot) else {
            continue;
        };
        answered += 1;
        if let Some(p) = question_points(question, answer, responses, category) {
            entry.0 += p.clamp(0.0, question.max);
        }
    }

    let mut sections = SectionScores {
        symptoms: 0.0,
        nutrition: 0.0,
        training: 0.0,
        sleep_recovery: 0.0,
        context: 0.0,
    };
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for (&section, &(got, max)) in &points {
        let score = if max > 0.0 { 100.0 * got / max } else { 0.0 };
        sections.set(section, round1(score));
        let w = config.weights.get(section);
        weighted += w * score;
        weight_sum += w;
    }
    let total = if weight_sum > 0.0 {
        round1((weighted / weight_sum).clamp(0.0, 100.0))
    } else {
        0.0
    };

    let workout_location = slot_answer(responses, category, LOCATION_SLOT)
        .and_then(Answer::as_option)
        .unwrap_or_default();

    QuizScoreResult {
        category,
        total,
        sections,
        level: config.thresholds(category).level_for(total),
        workout_location,
        habit_condition: classify_habits(responses, category),
        answered,
    }
}

fn question_points(
    question: &Question,
    answer: &Answer,
    responses: &QuizResponses,
    category: Category,
) -> Option<f64> {
    match question.rubric {
        Rubric::Scale => answer.as_number(),
        Rubric::Age => answer.as_number().filter(|age| *age > 0.0).map(age_points),
        Rubric::Bmi => {
            let weight = answer.as_number().filter(|w| *w > 0.0)?;
            let height = slot_answer(responses, category, question.slot + 1)
                .and_then(Answer::as_number)
                .filter(|h| *h > 0.0)?;
            Some(bmi_points(weight, height))
        }
        Rubric::SessionsPerWeek => answer
            .as_number()
            .map(|n| 4.0 - n.floor().clamp(0.0, 4.0)),
        Rubric::Experience => answer.as_option().map(|exp| match exp {
            TrainingExperience::None => 3.0,
            TrainingExperience::Beginner => 2.0,
            TrainingExperience::Intermediate => 1.0,
            TrainingExperience::Advanced => 0.0,
        }),
        Rubric::Nutrition => answer.as_option().map(|quality| match quality {
            NutritionQuality::Balanced => 0.0,
            NutritionQuality::Average => 1.5,
            NutritionQuality::Poor => 3.0,
        }),
        Rubric::MealsPerDay => answer.as_number().map(|n| match n.round() as i64 {
            3..=5 => 0.0,
            2 | 6 => 1.0,
            _ => 2.0,
        }),
        Rubric::Water => answer.as_number().map(|v| {
            // Anything above 100 is read as millilitres.
            let litres = if v > 100.0 { v / 1000.0 } else { v };
            if litres >= 2.0 {
                0.0
            } else if litres >= 1.5 {
                1.0
            } else {
                2.0
            }
        }),
        Rubric::Smoking => answer.as_option().map(|s| match s {
            SmokingFrequency::Never => 0.0,
            SmokingFrequency::Occasionally => 1.5,
            SmokingFrequency::Daily => 3.0,
        }),
        Rubric::Alcohol => answer.as_option().map(|a| match a {
            AlcoholFrequency::Never => 0.0,
            AlcoholFrequency::Rarely => 0.5,
            AlcoholFrequency::Weekly => 1.5,
            AlcoholFrequency::Daily => 3.0,
        }),
        Rubric::SleepHours => answer.as_number().map(|hours| {
            if hours >= 8.0 {
                0.0
            } else if hours >= 7.0 {
                1.0
            } else if hours >= 6.0 {
                2.0
            } else if hours >= 5.0 {
                3.0
            } else {
                4.0
            }
        }),
        Rubric::Height | Rubric::Unscored => Some(0.0),
    }
}

fn age_points(age: f64) -> f64 {
    if age < 30.0 {
        0.0
    } else if age < 40.0 {
        1.0
    } else if age < 50.0 {
        2.0
    } else {
        3.0
    }
}

fn bmi_points(weight_kg: f64, height: f64) -> f64 {
    // Heights under 3 are taken as metres.
    let metres = if height < 3.0 { height } else { height / 100.0 };
    let bmi = weight_kg / (metres * metres);
    if (18.5..25.0).contains(&bmi) {
        0.0
    } else if (25.0..30.0).contains(&bmi) {
        1.5
    } else if bmi < 18.5 {
        2.0
    } else {
        3.0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(prefix: &str, pairs: &[(u8, Answer)]) -> QuizResponses {
        pairs
            .iter()
            .map(|(slot, answer)| (format!("{prefix}_q{slot}"), answer.clone()))
            .collect()
    }

    fn n(v: f64) -> Answer {
        Answer::Number(v)
    }

    fn t(s: &str) -> Answer {
        Answer::Text(s.into())
    }

    fn full_high_need(prefix: &str) -> QuizResponses {
        responses(
            prefix,
            &[
                (1, n(10.0)),
                (2, n(10.0)),
                (3, n(10.0)),
                (4, n(10.0)),
                (5, n(10.0)),
                (6, n(55.0)),
                (7, n(110.0)),
                (8, n(175.0)),
                (9, n(0.0)),
                (10, t("none")),
                (11, t("poor")),
                (12, t("daily")),
                (13, t("daily")),
                (14, n(4.0)),
                (15, n(1.0)),
                (16, n(0.5)),
                (17, n(10.0)),
                (18, t("gym")),
            ],
        )
    }

    fn full_low_need(prefix: &str) -> QuizResponses {
        responses(
            prefix,
            &[
                (1, n(0.0)),
                (2, n(0.0)),
                (3, n(0.0)),
                (4, n(0.0)),
                (5, n(0.0)),
                (6, n(25.0)),
                (7, n(70.0)),
                (8, n(180.0)),
                (9, n(5.0)),
                (10, t("advanced")),
                (11, t("balanced")),
                (12, t("never")),
                (13, t("never")),
                (14, n(8.0)),
                (15, n(4.0)),
                (16, n(2.5)),
                (17, n(0.0)),
            ],
        )
    }

    #[test]
    fn deterministic() {
        let r = full_high_need("ene");
        let config = ScoringConfig::default();
        let a = calculate_quiz_score(&r, Category::Energy, &config);
        let b = calculate_quiz_score(&r, Category::Energy, &config);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn extremes_hit_the_bounds() {
        let config = ScoringConfig::default();
        let high = calculate_quiz_score(&full_high_need("ene"), Category::Energy, &config);
        assert_eq!(high.total, 100.0);
        assert_eq!(high.sections.symptoms, 100.0);
        assert_eq!(high.sections.context, 100.0);
        assert_eq!(high.answered, 18);
        assert_eq!(high.workout_location, WorkoutLocation::Gym);
        assert_eq!(high.habit_condition, HabitCondition::UnhealthyHabits);

        let low = calculate_quiz_score(&full_low_need("ene"), Category::Energy, &config);
        assert_eq!(low.total, 0.0);
        assert_eq!(low.workout_location, WorkoutLocation::Home);
        assert_eq!(low.habit_condition, HabitCondition::HealthyHabits);
    }

    #[test]
    fn empty_responses_give_a_best_effort_result() {
        let result = calculate_quiz_score(&QuizResponses::new(), Category::Libido, &ScoringConfig::default());
        assert_eq!(result.total, 0.0);
        assert_eq!(result.answered, 0);
        assert_eq!(result.level, Level::Low);
        assert_eq!(result.habit_condition, HabitCondition::AverageHabits);
    }

    #[test]
    fn out_of_range_and_garbage_answers_stay_bounded() {
        let r = responses(
            "mus",
            &[
                (1, n(500.0)),
                (2, n(-20.0)),
                (9, n(-3.0)),
                (11, t("pizza every day")),
                (14, t("not sure")),
                (16, n(f64::MAX)),
            ],
        );
        let result = calculate_quiz_score(&r, Category::Muscle, &ScoringConfig::default());
        assert!((0.0..=100.0).contains(&result.total));
        assert_eq!(result.sections.symptoms, 20.0);
    }

    #[test]
    fn other_prefixes_are_ignored() {
        let config = ScoringConfig::default();
        let result = calculate_quiz_score(&full_high_need("lib"), Category::Energy, &config);
        assert_eq!(result.total, 0.0);
        assert_eq!(result.answered, 0);
    }

    #[test]
    fn energy_level_rises_with_need() {
        let config = ScoringConfig::default();
        let high = calculate_quiz_score(&full_high_need("ene"), Category::Energy, &config);
        let low = calculate_quiz_score(&full_low_need("ene"), Category::Energy, &config);
        assert_eq!(high.level, Level::High);
        assert_eq!(low.level, Level::Low);
    }

    #[test]
    fn muscle_level_falls_with_need() {
        let config = ScoringConfig::default();
        let high = calculate_quiz_score(&full_high_need("mus"), Category::Muscle, &config);
        let low = calculate_quiz_score(&full_low_need("mus"), Category::Muscle, &config);
        assert_eq!(high.level, Level::Low);
        assert_eq!(low.level, Level::High);
    }

    #[test]
    fn level_is_monotonic_in_total() {
        let asc = LevelThresholds {
            low_below: 35.0,
            high_from: 65.0,
            direction: LevelDirection::Ascending,
        };
        let desc = LevelThresholds {
            direction: LevelDirection::Descending,
            ..asc
        };
        let mut prev_asc = Level::Low;
        let mut prev_desc = Level::High;
        for step in 0..=100 {
            let total = f64::from(step);
            let a = asc.level_for(total);
            let d = desc.level_for(total);
            assert!(a >= prev_asc);
            assert!(d <= prev_desc);
            prev_asc = a;
            prev_desc = d;
        }
        assert_eq!(asc.level_for(34.9), Level::Low);
        assert_eq!(asc.level_for(35.0), Level::Normal);
        assert_eq!(asc.level_for(65.0), Level::High);
    }

    #[test]
    fn bmi_needs_both_weight_and_height() {
        let config = ScoringConfig::default();
        let only_weight = responses("ene", &[(7, n(120.0))]);
        let result = calculate_quiz_score(&only_weight, Category::Energy, &config);
        assert_eq!(result.sections.context, 0.0);

        let both = responses("ene", &[(7, n(120.0)), (8, n(1.75))]);
        let result = calculate_quiz_score(&both, Category::Energy, &config);
        assert_eq!(result.sections.context, 50.0);
    }

    #[test]
    fn weights_shape_the_total() {
        let r = responses("ene", &[(1, n(10.0)), (2, n(10.0)), (3, n(10.0)), (4, n(10.0)), (5, n(10.0))]);
        let only_symptoms = ScoringConfig {
            weights: SectionWeights {
                symptoms: 1.0,
                nutrition: 0.0,
                training: 0.0,
                sleep_recovery: 0.0,
                context: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert_eq!(calculate_quiz_score(&r, Category::Energy, &only_symptoms).total, 100.0);
        assert_eq!(
            calculate_quiz_score(&r, Category::Energy, &ScoringConfig::default()).total,
            35.0
        );
    }

    #[test]
    fn config_validation() {
        let mut config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        config.weights.training = -1.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.levels.insert(
            Category::Energy,
            LevelThresholds {
                low_below: 70.0,
                high_from: 30.0,
                direction: LevelDirection::Ascending,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_json_keeps_defaults() {
        let config: ScoringConfig = serde_json::from_str(r#"{"weights": {"symptoms": 1, "nutrition": 1, "training": 1, "sleep_recovery": 1, "context": 1}}"#).unwrap();
        assert_eq!(config.levels, default_levels());
        assert_eq!(config.weights.context, 1.0);
    }
}
