//! Engine settings loaded from the environment.
//!
//! Every key is prefixed with `QUIZCRAFT_`. Missing or unparseable values
//! fall back to the defaults below.
//!
//! Generator:
//! - `QUIZCRAFT_OLLAMA_BASE_URL` - OpenAI-compatible endpoint (default: http://localhost:11434)
//! - `QUIZCRAFT_OLLAMA_MODEL` - Model name (default: llama3.2)
//! - `QUIZCRAFT_LLM_TIMEOUT_SECS` - Per-attempt timeout (default: 30)
//! - `QUIZCRAFT_LLM_MAX_RETRIES` - Retries on unavailability (default: 1)
//! - `QUIZCRAFT_MALFORMED_RETRY_CAP` - Regenerations of malformed output (default: 1)
//!
//! Game:
//! - `QUIZCRAFT_CATALOG_PATH` - Catalog JSON file (default: data/catalog.json)
//! - `QUIZCRAFT_MAX_TOTAL_ROUNDS` - Upper bound on rounds per session (default: 20)
//! - `QUIZCRAFT_OPTIONS_PER_QUESTION` - Options in catalog-built lists (default: 4)
//! - `QUIZCRAFT_HINT_ON_WRONG_ANSWER` - Attach a hint to wrong guesses (default: false)
//! - `QUIZCRAFT_KEEP_ROUND_MARKERS` - Resolved-round markers kept in the transcript (default: 3)
//! - `QUIZCRAFT_COMPLETION_BONUS` - Bonus for finishing all rounds (default: 25)
//! - `QUIZCRAFT_MAX_HINTS_PER_ROUND` - Hint budget per round (default: 2)
//!
//! Terminal runner:
//! - `QUIZCRAFT_DIFFICULTY` (default: medium), `QUIZCRAFT_AGE_BAND` (default: adult)
//! - `QUIZCRAFT_ROUNDS` (default: 5), `QUIZCRAFT_SEED` (unset = unseeded)

use std::time::Duration;

use serde::{Deserialize, Serialize};

use quizcraft_domain::{AgeBand, Difficulty, ScoringRules};

use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use crate::infrastructure::resilient_llm::RetryConfig;

const PREFIX: &str = "QUIZCRAFT_";

fn env_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(&format!("{PREFIX}{key}"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub malformed_retry_cap: u32,

    pub catalog_path: String,
    pub max_total_rounds: u32,
    pub options_per_question: usize,
    pub hint_on_wrong_answer: bool,
    pub keep_round_markers: usize,
    pub completion_bonus: u32,
    pub max_hints_per_round: u32,

    pub difficulty: Difficulty,
    pub age_band: AgeBand,
    pub rounds: u32,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let rules = ScoringRules::default();
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            llm_timeout_secs: 30,
            llm_max_retries: 1,
            malformed_retry_cap: 1,
            catalog_path: "data/catalog.json".to_string(),
            max_total_rounds: 20,
            options_per_question: 4,
            hint_on_wrong_answer: false,
            keep_round_markers: 3,
            completion_bonus: rules.completion_bonus,
            max_hints_per_round: rules.max_hints_per_round,
            difficulty: Difficulty::Medium,
            age_band: AgeBand::Adult,
            rounds: 5,
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            ollama_base_url: env_or(&lookup, "OLLAMA_BASE_URL", d.ollama_base_url),
            ollama_model: env_or(&lookup, "OLLAMA_MODEL", d.ollama_model),
            llm_timeout_secs: env_or(&lookup, "LLM_TIMEOUT_SECS", d.llm_timeout_secs),
            llm_max_retries: env_or(&lookup, "LLM_MAX_RETRIES", d.llm_max_retries),
            malformed_retry_cap: env_or(&lookup, "MALFORMED_RETRY_CAP", d.malformed_retry_cap),
            catalog_path: env_or(&lookup, "CATALOG_PATH", d.catalog_path),
            max_total_rounds: env_or(&lookup, "MAX_TOTAL_ROUNDS", d.max_total_rounds),
            options_per_question: env_or(&lookup, "OPTIONS_PER_QUESTION", d.options_per_question)
                .max(quizcraft_domain::MIN_OPTIONS),
            hint_on_wrong_answer: env_or(&lookup, "HINT_ON_WRONG_ANSWER", d.hint_on_wrong_answer),
            keep_round_markers: env_or(&lookup, "KEEP_ROUND_MARKERS", d.keep_round_markers),
            completion_bonus: env_or(&lookup, "COMPLETION_BONUS", d.completion_bonus),
            max_hints_per_round: env_or(&lookup, "MAX_HINTS_PER_ROUND", d.max_hints_per_round),
            difficulty: env_or(&lookup, "DIFFICULTY", d.difficulty),
            age_band: env_or(&lookup, "AGE_BAND", d.age_band),
            rounds: env_or(&lookup, "ROUNDS", d.rounds),
            seed: lookup(&format!("{PREFIX}SEED")).and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Retry policy for the generator client; each attempt gets `llm_timeout_secs`.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_max_retries(self.llm_max_retries)
            .with_attempt_timeout(Duration::from_secs(self.llm_timeout_secs))
    }

    /// Deadline for one generator turn, long enough for every client retry.
    pub fn generator_deadline(&self) -> Duration {
        self.retry_config()
            .worst_case(Duration::from_secs(self.llm_timeout_secs))
    }

    /// Scoring table with the configured bonus and hint budget.
    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            completion_bonus: self.completion_bonus,
            max_hints_per_round: self.max_hints_per_round,
            ..ScoringRules::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> EngineSettings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (format!("QUIZCRAFT_{k}"), v.to_string()))
            .collect();
        EngineSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s, EngineSettings::default());
        assert_eq!(s.llm_max_retries, 1);
        assert_eq!(s.malformed_retry_cap, 1);
        assert_eq!(s.max_total_rounds, 20);
        assert!(!s.hint_on_wrong_answer);
        assert_eq!(s.seed, None);
    }

    #[test]
    fn reads_prefixed_keys() {
        let s = settings(&[
            ("OLLAMA_MODEL", "qwen2.5"),
            ("HINT_ON_WRONG_ANSWER", "true"),
            ("DIFFICULTY", "Hard"),
            ("AGE_BAND", "young"),
            ("SEED", "42"),
            ("COMPLETION_BONUS", "40"),
        ]);
        assert_eq!(s.ollama_model, "qwen2.5");
        assert!(s.hint_on_wrong_answer);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.age_band, AgeBand::Young);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.scoring_rules().completion_bonus, 40);
    }

    #[test]
    fn generator_deadline_outlasts_client_retries() {
        let s = settings(&[("LLM_TIMEOUT_SECS", "10"), ("LLM_MAX_RETRIES", "1")]);
        let retry = s.retry_config();
        assert_eq!(retry.max_retries, 1);
        assert_eq!(retry.attempt_timeout, Some(Duration::from_secs(10)));
        assert!(s.generator_deadline() > Duration::from_secs(20));

        let single = settings(&[("LLM_TIMEOUT_SECS", "10"), ("LLM_MAX_RETRIES", "0")]);
        assert_eq!(single.generator_deadline(), Duration::from_secs(10));
    }

    #[test]
    fn unparseable_values_fall_back() {
        let s = settings(&[("ROUNDS", "many"), ("DIFFICULTY", "brutal"), ("OPTIONS_PER_QUESTION", "1")]);
        assert_eq!(s.rounds, 5);
        assert_eq!(s.difficulty, Difficulty::Medium);
        assert_eq!(s.options_per_question, 2);
    }

    #[test]
    fn scoring_rules_keep_reward_table() {
        let rules = settings(&[("MAX_HINTS_PER_ROUND", "3")]).scoring_rules();
        assert_eq!(rules.max_hints_per_round, 3);
        assert_eq!(rules.base_points(Difficulty::Hard), 15);
        assert_eq!(rules.hint_cost(Difficulty::Hard), 2);
    }
}
