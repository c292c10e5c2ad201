use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODELS: &[&str] = &[
    "meta-llama/llama-3.3-70b-instruct:free",
    "mistralai/mistral-7b-instruct:free",
    "google/gemma-2-9b-it:free",
];

#[derive(Debug, Clone, Deserialize)]
pub struct CoachConfig {
    pub api_key: String,
    pub base_url: String,
    /// Tried in order.
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Directory with `meal_plans.json`, `workout_plans.json` and `supplements.json`.
    pub content_dir: Option<PathBuf>,
    pub scoring_config_path: Option<PathBuf>,
    /// `None` when `OPENROUTER_API_KEY` is unset; coach endpoints then answer 503.
    pub coach: Option<CoachConfig>,
    pub coach_rate_limit: u32,
    pub coach_rate_window_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let coach = env_opt("OPENROUTER_API_KEY").map(|api_key| CoachConfig {
            api_key,
            base_url: env_opt("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.into()),
            models: env_opt("OPENROUTER_MODELS")
                .map(|raw| parse_models(&raw))
                .filter(|models| !models.is_empty())
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODELS.iter().map(|m| m.to_string()).collect()),
        });

        Ok(Self {
            database_url,
            host: env_opt("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: env_opt("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            content_dir: env_opt("CONTENT_DIR").map(PathBuf::from),
            scoring_config_path: env_opt("SCORING_CONFIG_PATH").map(PathBuf::from),
            coach,
            coach_rate_limit: env_opt("COACH_RATE_LIMIT")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(20),
            coach_rate_window_secs: env_opt("COACH_RATE_WINDOW_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3600),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_is_ordered_and_trimmed() {
        assert_eq!(
            parse_models(" a/b:free , ,c/d "),
            vec!["a/b:free".to_string(), "c/d".to_string()]
        );
    }
}
