//! Generator context types - the prompt bundle built from session state.
//!
//! These DTOs are serialized to JSON for outbound requests and are
//! intentionally owned by the engine (not the domain) to keep domain pure.

use serde::{Deserialize, Serialize};

/// Complete instruction payload sent to the generator for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBundle {
    /// Who the generator plays
    pub persona: String,
    /// Rules that apply to every turn
    pub behavior_rules: String,
    /// How to report the turn through the tool call
    pub tool_instructions: String,
    pub calibration: CalibrationContext,
    /// The item being asked about right now
    pub current_item: ItemContext,
    /// The queued item, so a correct answer can roll straight into the next question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item: Option<ItemContext>,
    pub progress: ProgressContext,
}

/// Difficulty and audience calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationContext {
    pub difficulty: String,
    pub age_band: String,
    /// Calibration text for the difficulty setting
    pub difficulty_guidance: String,
    /// Tone guidance for the age band
    pub audience_guidance: String,
    /// Number of options a question should offer
    pub options_per_question: usize,
}

/// Facts about one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContext {
    /// The correct answer, verbatim
    pub answer: String,
    pub category: String,
    /// E.g. "Which animal am I?"
    pub question_frame: String,
    pub subject_noun: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category_guidance: String,
    pub opening_clue: String,
    pub facts: Vec<String>,
    /// Precomputed hints in the order they will be handed out
    pub hints: Vec<HintContext>,
    /// True when the item is a repeat from an exhausted catalog
    #[serde(default)]
    pub review_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintContext {
    pub hint_number: u32,
    pub text: String,
}

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressContext {
    pub round_number: u32,
    pub total_rounds: u32,
    pub hints_used: u32,
    pub hints_remaining: u32,
    pub wrong_guesses: u32,
}

impl PromptBundle {
    /// Render the bundle as the system prompt text.
    pub fn to_system_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.persona);
        prompt.push_str("\n\n== RULES ==\n");
        prompt.push_str(&self.behavior_rules);
        prompt.push_str("\n\n== RESPONSE FORMAT ==\n");
        prompt.push_str(&self.tool_instructions);

        prompt.push_str("\n\n== CALIBRATION ==\n");
        prompt.push_str(&format!(
            "Difficulty: {}. {}\nAudience: {}. {}\nOffer exactly {} options per question.\n",
            self.calibration.difficulty,
            self.calibration.difficulty_guidance,
            self.calibration.age_band,
            self.calibration.audience_guidance,
            self.calibration.options_per_question,
        ));

        prompt.push_str(&format!(
            "\n== ROUND {} OF {} ==\nHints used: {} (remaining: {}). Wrong guesses: {}.\n",
            self.progress.round_number,
            self.progress.total_rounds,
            self.progress.hints_used,
            self.progress.hints_remaining,
            self.progress.wrong_guesses,
        ));

        prompt.push_str("\n== CURRENT ITEM ==\n");
        render_item(&mut prompt, &self.current_item);

        match &self.next_item {
            Some(next) => {
                prompt.push_str("\n== NEXT ITEM (ask about it only after a correct answer) ==\n");
                render_item(&mut prompt, next);
            }
            None => prompt.push_str("\nThis is the final round.\n"),
        }

        prompt
    }
}

fn render_item(prompt: &mut String, item: &ItemContext) {
    prompt.push_str(&format!(
        "Answer: {}\nCategory: {}\nQuestion: {}\nOpening clue: {}\n",
        item.answer, item.category, item.question_frame, item.opening_clue
    ));
    if item.review_mode {
        prompt.push_str("This is a review question the player has seen before.\n");
    }
    if !item.category_guidance.is_empty() {
        prompt.push_str(&format!("Guidance: {}\n", item.category_guidance));
    }
    prompt.push_str("Facts:\n");
    for fact in &item.facts {
        prompt.push_str(&format!("- {}\n", fact));
    }
    if !item.hints.is_empty() {
        prompt.push_str("Hints:\n");
        for hint in &item.hints {
            prompt.push_str(&format!("{}. {}\n", hint.hint_number, hint.text));
        }
    }
}
