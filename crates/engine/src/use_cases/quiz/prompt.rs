//! Prompt assembly: session record to `PromptBundle` and generator request.

use std::sync::Arc;

use quizcraft_domain::{
    DomainError, HintPlan, QuizItem, Transcript, TranscriptEntryKind, TranscriptRole,
};

use crate::infrastructure::ports::{ChatMessage, LlmRequest};
use crate::llm_context::{
    CalibrationContext, HintContext, ItemContext, ProgressContext, PromptBundle,
};
use crate::prompt_templates::{audience_key, calibration_key, keys, PromptTemplates};
use crate::stores::SessionRecord;

use super::content::QuizContent;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 400;

pub struct PromptAssembler {
    content: Arc<QuizContent>,
    templates: PromptTemplates,
}

impl PromptAssembler {
    pub fn new(content: Arc<QuizContent>, templates: PromptTemplates) -> Self {
        Self { content, templates }
    }

    /// Snapshot the session into a bundle for one generator turn.
    pub fn bundle(&self, record: &SessionRecord) -> Result<PromptBundle, DomainError> {
        let session = &record.session;
        let settings = session.settings();
        let max_hints = self.content.rules().max_hints_per_round;

        let current = self.content.item(session.current_item())?;
        let current_item = self.item_context(current, &record.current_hints, session.is_review_round());

        let next_item = match (session.next_item(), &record.lookahead_hints) {
            (Some(id), Some(hints)) => {
                let item = self.content.item(id)?;
                Some(self.item_context(item, hints, false))
            }
            (Some(id), None) => {
                let item = self.content.item(id)?;
                let hints = self.content.plan_hints(id, session)?;
                Some(self.item_context(item, &hints, false))
            }
            (None, _) => None,
        };

        Ok(PromptBundle {
            persona: self.templates.get(keys::HOST_PERSONA),
            behavior_rules: self.templates.get(keys::HOST_BEHAVIOR_RULES),
            tool_instructions: self.templates.get(keys::HOST_TOOL_INSTRUCTIONS),
            calibration: CalibrationContext {
                difficulty: settings.difficulty().to_string(),
                age_band: settings.age_band().to_string(),
                difficulty_guidance: self.templates.get(calibration_key(settings.difficulty())),
                audience_guidance: self.templates.get(audience_key(settings.age_band())),
                options_per_question: self.content.policy().options_per_question,
            },
            current_item,
            next_item,
            progress: ProgressContext {
                round_number: session.round_number(),
                total_rounds: session.total_rounds(),
                hints_used: session.hints_used_this_round(),
                hints_remaining: max_hints.saturating_sub(session.hints_used_this_round()),
                wrong_guesses: session.wrong_guesses_this_round(),
            },
        })
    }

    fn item_context(&self, item: &QuizItem, hints: &HintPlan, review_mode: bool) -> ItemContext {
        let prompt = self.content.category_prompt(item);
        ItemContext {
            answer: item.answer().to_string(),
            category: item.category().to_string(),
            question_frame: prompt.question_frame,
            subject_noun: prompt.subject_noun,
            category_guidance: prompt.guidance,
            opening_clue: item.opening_clue().to_string(),
            facts: item.facts().to_vec(),
            hints: hints
                .hints()
                .iter()
                .map(|h| HintContext {
                    hint_number: h.hint_number(),
                    text: h.text().to_string(),
                })
                .collect(),
            review_mode,
        }
    }

    /// Generator request: system prompt from the bundle, history from the
    /// transcript, then the player's latest message if there is one.
    pub fn request(
        &self,
        bundle: &PromptBundle,
        transcript: &Transcript,
        player_message: Option<&str>,
    ) -> LlmRequest {
        let mut messages = transcript_messages(transcript);
        if let Some(text) = player_message {
            messages.push(ChatMessage::user(text));
        }
        LlmRequest::new(messages)
            .with_system_prompt(bundle.to_system_prompt())
            .with_temperature(TEMPERATURE)
            .with_max_tokens(Some(MAX_TOKENS))
    }
}

/// Flatten transcript entries into chat messages.
pub fn transcript_messages(transcript: &Transcript) -> Vec<ChatMessage> {
    transcript
        .entries()
        .iter()
        .map(|entry| match entry.kind() {
            TranscriptEntryKind::Message { role, text } => match role {
                TranscriptRole::Player => ChatMessage::user(text.clone()),
                TranscriptRole::Generator | TranscriptRole::Engine => {
                    ChatMessage::assistant(text.clone())
                }
            },
            TranscriptEntryKind::ToolCall { name, arguments } => {
                ChatMessage::assistant(format!("[{}] {}", name, arguments))
            }
            TranscriptEntryKind::ToolResult { name, content } => {
                ChatMessage::system(format!("[{} result] {}", name, content))
            }
            TranscriptEntryKind::RoundMarker { summary } => {
                ChatMessage::system(format!("Earlier: {}", summary))
            }
        })
        .collect()
}
