use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{macros::format_description, Date, Weekday};

/// A value outside one of the closed enums was passed in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! closed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

/// Program track chosen at the start of the quiz. Fixed for the program's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Energy,
    Libido,
    Muscle,
}

closed_enum!(Category, "category", {
    Energy => "energy",
    Libido => "libido",
    Muscle => "muscle",
});

impl Category {
    /// Prefix used for this category's question ids (`ene_q11`, `lib_q11`, `mus_q11`).
    pub fn question_prefix(self) -> &'static str {
        match self {
            Category::Energy => "ene",
            Category::Libido => "lib",
            Category::Muscle => "mus",
        }
    }
}

/// Program intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Normal,
    High,
}

closed_enum!(Level, "level", {
    Low => "low",
    Normal => "normal",
    High => "high",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutLocation {
    #[default]
    Home,
    Gym,
}

closed_enum!(WorkoutLocation, "workout location", {
    Home => "home",
    Gym => "gym",
});

/// Dietary preference, ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietaryPreference {
    #[default]
    Omnivor,
    Pescatarian,
    Vegetarian,
    Vegan,
}

closed_enum!(DietaryPreference, "dietary preference", {
    Omnivor => "omnivor",
    Pescatarian => "pescatarian",
    Vegetarian => "vegetarian",
    Vegan => "vegan",
});

impl DietaryPreference {
    /// Next value in the toggle ring: omnivor → pescatarian → vegetarian → vegan → omnivor.
    pub fn next(self) -> Self {
        match self {
            DietaryPreference::Omnivor => DietaryPreference::Pescatarian,
            DietaryPreference::Pescatarian => DietaryPreference::Vegetarian,
            DietaryPreference::Vegetarian => DietaryPreference::Vegan,
            DietaryPreference::Vegan => DietaryPreference::Omnivor,
        }
    }

    pub fn is_default(self) -> bool {
        self == DietaryPreference::Omnivor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

closed_enum!(DayOfWeek, "day of week", {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        }
    }
}

impl From<Date> for DayOfWeek {
    fn from(date: Date) -> Self {
        date.weekday().into()
    }
}

/// Which static tables a user's dashboard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramAssignment {
    pub category: Category,
    pub level: Level,
    pub workout_location: WorkoutLocation,
}

/// Parses `YYYY-MM-DD`.
pub fn parse_iso_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
}
