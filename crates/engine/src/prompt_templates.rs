//! Configurable generator prompt templates used by the engine.
//!
//! Each template has a hard-coded default that can be overridden with an
//! environment variable (`QUIZCRAFT_PROMPT_<KEY>`, dots become underscores).

use serde::{Deserialize, Serialize};

use quizcraft_domain::{AgeBand, Difficulty};

/// Categories for organizing prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptTemplateCategory {
    /// Host persona and conduct.
    Host,
    /// Difficulty and age calibration text.
    Calibration,
}

impl PromptTemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Calibration => "calibration",
        }
    }
}

/// Metadata about a prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplateMetadata {
    /// Unique key for this template.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    pub category: PromptTemplateCategory,
    /// The hard-coded default value.
    pub default_value: String,
    /// Environment variable name for override.
    pub env_var: String,
}

/// All prompt template keys as constants.
pub mod keys {
    // === Host ===
    /// Who the generator plays.
    pub const HOST_PERSONA: &str = "host.persona";
    /// Rules the generator must follow on every turn.
    pub const HOST_BEHAVIOR_RULES: &str = "host.behavior_rules";
    /// How to report the turn through the `quiz_turn` tool.
    pub const HOST_TOOL_INSTRUCTIONS: &str = "host.tool_instructions";

    // === Calibration ===
    pub const CALIBRATION_EASY: &str = "calibration.easy";
    pub const CALIBRATION_MEDIUM: &str = "calibration.medium";
    pub const CALIBRATION_HARD: &str = "calibration.hard";
    pub const AUDIENCE_YOUNG: &str = "audience.young";
    pub const AUDIENCE_TEEN: &str = "audience.teen";
    pub const AUDIENCE_ADULT: &str = "audience.adult";
}

/// Default values for all prompt templates.
pub mod defaults {
    pub const HOST_PERSONA: &str = "You are Quizcraft, a warm and playful quiz host. \
You describe a mystery subject in the first person and the player guesses what it is.";

    pub const HOST_BEHAVIOR_RULES: &str = "\
- Never say the answer before the round is resolved.
- Only use the facts provided for the current item. Do not invent new facts.
- Never award, deduct or mention point values; the engine keeps score.
- Hints are supplied by the engine. Repeat a supplied hint instead of writing your own.
- Keep every message short: two or three sentences.
- If the player's intent is unclear, ask them to answer, ask for a hint, or skip.";

    pub const HOST_TOOL_INSTRUCTIONS: &str = "\
Always reply by calling the quiz_turn tool exactly once.
- signal: what the player's last message meant (answer, dont_know, skip, continue or unclear)
- correct: for an answer, whether it names the current item
- message: what you say to the player
- options: the multiple-choice list for the question you are asking now
When the answer is correct, congratulate the player and immediately ask the next \
question about the next item, with options for that next item.";

    pub const CALIBRATION_EASY: &str =
        "Use simple words and generous encouragement. Options should be clearly different.";
    pub const CALIBRATION_MEDIUM: &str =
        "Use a friendly tone. Options may include one plausible lookalike.";
    pub const CALIBRATION_HARD: &str =
        "Be concise. Options should be plausible and from the same family as the answer.";

    pub const AUDIENCE_YOUNG: &str =
        "The player is a young child (about 6 to 9). Use very short sentences and familiar words.";
    pub const AUDIENCE_TEEN: &str =
        "The player is a pre-teen or teen (about 10 to 14). Keep it lively and age-appropriate.";
    pub const AUDIENCE_ADULT: &str = "The player is an adult.";
}

/// Convert a template key to its environment variable name.
///
/// `host.persona` becomes `QUIZCRAFT_PROMPT_HOST_PERSONA`.
pub fn key_to_env_var(key: &str) -> String {
    format!("QUIZCRAFT_PROMPT_{}", key.to_uppercase().replace('.', "_"))
}

/// Get the default value for a template key.
pub fn get_default(key: &str) -> Option<&'static str> {
    match key {
        keys::HOST_PERSONA => Some(defaults::HOST_PERSONA),
        keys::HOST_BEHAVIOR_RULES => Some(defaults::HOST_BEHAVIOR_RULES),
        keys::HOST_TOOL_INSTRUCTIONS => Some(defaults::HOST_TOOL_INSTRUCTIONS),
        keys::CALIBRATION_EASY => Some(defaults::CALIBRATION_EASY),
        keys::CALIBRATION_MEDIUM => Some(defaults::CALIBRATION_MEDIUM),
        keys::CALIBRATION_HARD => Some(defaults::CALIBRATION_HARD),
        keys::AUDIENCE_YOUNG => Some(defaults::AUDIENCE_YOUNG),
        keys::AUDIENCE_TEEN => Some(defaults::AUDIENCE_TEEN),
        keys::AUDIENCE_ADULT => Some(defaults::AUDIENCE_ADULT),
        _ => None,
    }
}

pub fn calibration_key(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => keys::CALIBRATION_EASY,
        Difficulty::Medium => keys::CALIBRATION_MEDIUM,
        Difficulty::Hard => keys::CALIBRATION_HARD,
    }
}

pub fn audience_key(age_band: AgeBand) -> &'static str {
    match age_band {
        AgeBand::Young => keys::AUDIENCE_YOUNG,
        AgeBand::Teen => keys::AUDIENCE_TEEN,
        AgeBand::Adult => keys::AUDIENCE_ADULT,
    }
}

/// Resolves templates: environment override first, then the default.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    overrides: std::collections::HashMap<String, String>,
}

impl PromptTemplates {
    /// Templates with overrides read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let overrides = all_keys()
            .into_iter()
            .filter_map(|key| {
                lookup(&key_to_env_var(key))
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (key.to_string(), value))
            })
            .collect();
        Self { overrides }
    }

    /// Resolved text for `key`; unknown keys resolve to an empty string.
    pub fn get(&self, key: &str) -> String {
        self.overrides
            .get(key)
            .cloned()
            .or_else(|| get_default(key).map(str::to_string))
            .unwrap_or_default()
    }
}

/// Get metadata for all prompt templates.
pub fn all_templates() -> Vec<PromptTemplateMetadata> {
    let entry = |key: &str, label: &str, category| PromptTemplateMetadata {
        key: key.to_string(),
        label: label.to_string(),
        category,
        default_value: get_default(key).unwrap_or_default().to_string(),
        env_var: key_to_env_var(key),
    };
    vec![
        entry(keys::HOST_PERSONA, "Host Persona", PromptTemplateCategory::Host),
        entry(keys::HOST_BEHAVIOR_RULES, "Host Behavior Rules", PromptTemplateCategory::Host),
        entry(keys::HOST_TOOL_INSTRUCTIONS, "Tool Instructions", PromptTemplateCategory::Host),
        entry(keys::CALIBRATION_EASY, "Easy Calibration", PromptTemplateCategory::Calibration),
        entry(keys::CALIBRATION_MEDIUM, "Medium Calibration", PromptTemplateCategory::Calibration),
        entry(keys::CALIBRATION_HARD, "Hard Calibration", PromptTemplateCategory::Calibration),
        entry(keys::AUDIENCE_YOUNG, "Young Audience", PromptTemplateCategory::Calibration),
        entry(keys::AUDIENCE_TEEN, "Teen Audience", PromptTemplateCategory::Calibration),
        entry(keys::AUDIENCE_ADULT, "Adult Audience", PromptTemplateCategory::Calibration),
    ]
}

/// Get all known template keys.
pub fn all_keys() -> Vec<&'static str> {
    vec![
        keys::HOST_PERSONA,
        keys::HOST_BEHAVIOR_RULES,
        keys::HOST_TOOL_INSTRUCTIONS,
        keys::CALIBRATION_EASY,
        keys::CALIBRATION_MEDIUM,
        keys::CALIBRATION_HARD,
        keys::AUDIENCE_YOUNG,
        keys::AUDIENCE_TEEN,
        keys::AUDIENCE_ADULT,
    ]
}
