//! Start session use case.
//!
//! Picks the first item and the look-ahead item, precomputes their hints,
//! and asks the generator for the opening question. When the generator
//! cannot help, the question is built from the catalog instead.

use std::sync::Arc;

use quizcraft_domain::{
    AgeBand, Difficulty, QuizSession, SessionId, SessionSettings, TranscriptRole,
};

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::llm_context::PromptBundle;
use crate::stores::{SessionRecord, SessionStore};

use super::content::QuizContent;
use super::fallback::fallback_question;
use super::generator::{GeneratorOutcome, TurnGenerator};
use super::options::{catalog_options, generator_options};
use super::prompt::PromptAssembler;
use super::QuizError;

/// Message that opens the generator conversation. Not kept in the transcript.
const OPENING_REQUEST: &str = "Start the quiz with the first question.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub difficulty: Difficulty,
    pub age_band: AgeBand,
    pub total_rounds: u32,
    pub seed: Option<u64>,
}

/// Result of starting a session.
#[derive(Debug, Clone)]
pub struct SessionStarted {
    pub session_id: SessionId,
    /// Bundle the opening question was generated from
    pub bundle: PromptBundle,
    pub opening_clue: String,
    /// Host's opening line
    pub question: String,
    pub options: Vec<String>,
    pub round_number: u32,
    pub total_rounds: u32,
    /// True when the question came from the catalog instead of the generator
    pub used_fallback: bool,
}

pub struct StartSession {
    content: Arc<QuizContent>,
    assembler: Arc<PromptAssembler>,
    generator: Arc<TurnGenerator>,
    store: Arc<SessionStore>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl StartSession {
    pub fn new(
        content: Arc<QuizContent>,
        assembler: Arc<PromptAssembler>,
        generator: Arc<TurnGenerator>,
        store: Arc<SessionStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            content,
            assembler,
            generator,
            store,
            clock,
            random,
        }
    }

    pub async fn execute(&self, request: StartRequest) -> Result<SessionStarted, QuizError> {
        // 1. Validate settings
        let max_rounds = self.content.policy().max_total_rounds;
        if request.total_rounds > max_rounds {
            return Err(QuizError::InvalidRequest(format!(
                "total rounds {} exceeds the maximum of {}",
                request.total_rounds, max_rounds
            )));
        }
        let mut settings =
            SessionSettings::new(request.difficulty, request.age_band, request.total_rounds)
                .map_err(|e| QuizError::InvalidRequest(e.to_string()))?;
        if let Some(seed) = request.seed {
            settings = settings.with_seed(seed);
        }

        // 2. Select round 1 and the look-ahead for round 2
        let random = self.random.as_ref();
        let current = self
            .content
            .select(&settings, &[], 1, |len| random.gen_index(len));
        let next = (settings.total_rounds() > 1).then(|| {
            self.content
                .select(&settings, &[current.item_id().clone()], 2, |len| {
                    random.gen_index(len)
                })
        });

        let session_id = SessionId::from_uuid(random.gen_uuid());
        let session = QuizSession::start(
            session_id,
            settings,
            &current,
            next.as_ref(),
            self.clock.now(),
        );

        // 3. Precompute hints for both items
        let current_hints = self.content.plan_hints(current.item_id(), &session)?;
        let lookahead_hints = next
            .as_ref()
            .map(|s| self.content.plan_hints(s.item_id(), &session))
            .transpose()?;
        let mut record = SessionRecord::new(session, current_hints, lookahead_hints);

        // 4. Opening question from the generator, or from the catalog
        let item = self.content.item(current.item_id())?.clone();
        let bundle = self.assembler.bundle(&record)?;
        let llm_request = self
            .assembler
            .request(&bundle, &record.transcript, Some(OPENING_REQUEST));

        let (question, options, role, used_fallback) =
            match self.generator.generate(llm_request).await {
                GeneratorOutcome::Turn(turn) => {
                    let options = generator_options(
                        &self.content,
                        &mut record.session,
                        &item,
                        turn.options,
                        random,
                    );
                    (turn.message, options, TranscriptRole::Generator, false)
                }
                GeneratorOutcome::Unavailable(reason) | GeneratorOutcome::Malformed(reason) => {
                    tracing::info!(
                        session_id = %session_id,
                        reason = %reason,
                        "Opening with a catalog-built question"
                    );
                    let prompt = self.content.category_prompt(&item);
                    let question = fallback_question(
                        1,
                        record.session.total_rounds(),
                        &prompt.question_frame,
                        item.opening_clue(),
                    );
                    let options = catalog_options(&self.content, &item, random);
                    (question, options, TranscriptRole::Engine, true)
                }
            };

        // 5. Store the session
        record.transcript.push_message(1, role, question.clone());
        record.current_options = options.clone();
        let total_rounds = record.session.total_rounds();
        self.store.insert(record);

        tracing::info!(
            session_id = %session_id,
            item_id = %item.id(),
            total_rounds,
            used_fallback,
            "Quiz session started"
        );

        Ok(SessionStarted {
            session_id,
            bundle,
            opening_clue: item.opening_clue().to_string(),
            question,
            options,
            round_number: 1,
            total_rounds,
            used_fallback,
        })
    }
}
