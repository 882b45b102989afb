//! Submit turn use case.
//!
//! Classifies one player input, applies it to the session and produces the
//! host's reply. The generator classifies free text and narrates; its
//! claims are checked here before anything touches the session, and the
//! turn falls back to catalog-only play when the generator is unavailable.

use std::sync::Arc;

use quizcraft_domain::{
    normalize, PrecomputedHint, QuizItem, RoundOutcome, SessionId, SessionStatus,
    SessionSummary, SessionUpdate, TranscriptRole,
};

use crate::game_tools::{ClassifiedSignal, QuizTurn, QUIZ_TURN_TOOL};
use crate::infrastructure::ports::{ClockPort, MediaRef, MediaSearchPort, RandomPort};
use crate::stores::{SessionRecord, SessionStore};

use super::content::QuizContent;
use super::fallback::{classify_locally, fallback_question, fallback_reply};
use super::generator::{GeneratorOutcome, TurnGenerator};
use super::options::{catalog_options, generator_options};
use super::prompt::PromptAssembler;
use super::QuizError;

/// What the player did this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// Free-form text, classified by the generator
    Text(String),
    /// 1-based index into the options last shown
    Choice(usize),
    DontKnow,
    Skip,
    Continue,
}

/// How a resolved round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub round_number: u32,
    pub answer: String,
    pub correct: bool,
    pub explanation: Option<String>,
    pub points_delta: u32,
    pub score: u32,
    pub status: SessionStatus,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: SessionId,
    /// Host's reply
    pub message: String,
    /// Signal the turn was applied as
    pub signal: ClassifiedSignal,
    /// Set when the turn resolved a round
    pub round_result: Option<RoundResult>,
    pub hint: Option<PrecomputedHint>,
    pub media: Option<MediaRef>,
    /// Options for the question now being asked; empty once finished
    pub options: Vec<String>,
    pub round_number: u32,
    pub total_rounds: u32,
    pub score: u32,
    pub status: SessionStatus,
    /// Set when the turn finished the session
    pub summary: Option<SessionSummary>,
    /// True when the reply was built without the generator's narration
    pub used_fallback: bool,
    pub updates: Vec<SessionUpdate>,
}

impl TurnOutcome {
    /// Statuses the session passed through during the turn.
    pub fn status_trail(&self) -> Vec<SessionStatus> {
        self.updates
            .iter()
            .filter_map(SessionUpdate::resulting_status)
            .collect()
    }
}

/// Round resolution details gathered while applying a signal.
struct Resolution {
    outcome: RoundOutcome,
    round_number: u32,
    points_delta: u32,
    advanced: bool,
}

pub struct SubmitTurn {
    content: Arc<QuizContent>,
    assembler: Arc<PromptAssembler>,
    generator: Arc<TurnGenerator>,
    store: Arc<SessionStore>,
    media: Arc<dyn MediaSearchPort>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl SubmitTurn {
    pub fn new(
        content: Arc<QuizContent>,
        assembler: Arc<PromptAssembler>,
        generator: Arc<TurnGenerator>,
        store: Arc<SessionStore>,
        media: Arc<dyn MediaSearchPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            content,
            assembler,
            generator,
            store,
            media,
            clock,
            random,
        }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        input: PlayerInput,
    ) -> Result<TurnOutcome, QuizError> {
        let handle = self.store.get(session_id).ok_or_else(|| {
            if self.store.is_archived(session_id) {
                QuizError::SessionFinished(session_id)
            } else {
                QuizError::SessionNotFound(session_id)
            }
        })?;

        // Turns for one session run one at a time
        let mut record = handle.lock().await;
        if record.session.is_finished() {
            return Err(QuizError::SessionFinished(session_id));
        }

        let mut draft = record.clone();
        let outcome = self.play(&mut draft, input).await?;

        if let Some(summary) = &outcome.summary {
            self.store.archive(summary.clone());
            tracing::info!(
                session_id = %session_id,
                score = summary.score,
                correct = summary.correct_count,
                "Quiz session finished"
            );
        }
        *record = draft;
        Ok(outcome)
    }

    async fn play(
        &self,
        record: &mut SessionRecord,
        input: PlayerInput,
    ) -> Result<TurnOutcome, QuizError> {
        let session_id = record.session.id();
        let round = record.session.round_number();
        let item = self.content.item(record.session.current_item())?.clone();

        // 1. Classify what can be classified without the generator
        let (player_text, local_signal) = self.pre_classify(record, &item, input)?;

        // 2. Ask the generator
        let bundle = self.assembler.bundle(record)?;
        let request = self
            .assembler
            .request(&bundle, &record.transcript, Some(&player_text));
        let (signal, turn) = match self.generator.generate(request).await {
            GeneratorOutcome::Turn(turn) => (local_signal.unwrap_or(turn.signal), Some(turn)),
            GeneratorOutcome::Unavailable(reason) => {
                tracing::info!(session_id = %session_id, round, reason = %reason, "Playing turn without generator");
                let signal = local_signal
                    .unwrap_or_else(|| classify_locally(&player_text, item.answer()));
                (signal, None)
            }
            GeneratorOutcome::Malformed(reason) => match local_signal {
                Some(signal) => (signal, None),
                None => return Err(QuizError::TryAgain(reason)),
            },
        };

        // The generator only narrates turns it classified the same way
        let turn = turn.filter(|t| t.signal == signal);
        let used_fallback = turn.is_none();

        record
            .transcript
            .push_message(round, TranscriptRole::Player, player_text);
        if turn.is_some() {
            record.transcript.push_tool_call(
                round,
                QUIZ_TURN_TOOL,
                serde_json::json!({ "signal": signal.as_str() }).to_string(),
            );
        }

        // 3. Apply the signal
        let mut updates = Vec::new();
        let mut hint = None;
        let mut outcome = None;
        let exhausted = record.session.hint_budget_exhausted(self.content.rules());
        match signal {
            ClassifiedSignal::Answer { correct: true } => outcome = Some(RoundOutcome::Correct),
            ClassifiedSignal::Answer { correct: false } => {
                updates.push(record.session.record_incorrect()?);
                if self.content.policy().hint_on_wrong_answer && !exhausted {
                    hint = self.give_hint(record, &mut updates)?;
                }
            }
            ClassifiedSignal::DontKnow | ClassifiedSignal::Skip => {
                if !exhausted {
                    hint = self.give_hint(record, &mut updates)?;
                }
                if hint.is_none() {
                    outcome = Some(RoundOutcome::Revealed);
                }
            }
            ClassifiedSignal::Continue | ClassifiedSignal::Unclear => {}
        }

        // 4. Resolve and advance
        let resolution = match outcome {
            Some(outcome) => Some(self.resolve(record, &item, outcome, &mut updates)?),
            None => None,
        };

        // 5. Options for whatever question is now open
        let options = self.next_options(record, turn.as_ref(), resolution.as_ref())?;
        record.current_options = options.clone();

        // 6. Reply
        let message = match &turn {
            Some(turn) => turn.message.clone(),
            None => self.fallback_message(record, &item, signal, hint.as_ref(), resolution.as_ref())?,
        };
        let role = if used_fallback {
            TranscriptRole::Engine
        } else {
            TranscriptRole::Generator
        };
        record
            .transcript
            .push_message(record.session.round_number(), role, message.clone());

        let media = match hint.as_ref().and_then(PrecomputedHint::media_query) {
            Some(query) => self.find_media(session_id, query).await,
            None => None,
        };

        let session = &record.session;
        let round_result = resolution.map(|r| RoundResult {
            round_number: r.round_number,
            answer: item.answer().to_string(),
            correct: r.outcome == RoundOutcome::Correct,
            explanation: turn.as_ref().and_then(|t| t.explanation.clone()),
            points_delta: r.points_delta,
            score: session.score(),
            status: session.status(),
        });
        let summary = session
            .is_finished()
            .then(|| session.summary(self.clock.now()));

        for update in &updates {
            tracing::debug!(session_id = %session_id, update = ?update, "Session updated");
        }

        Ok(TurnOutcome {
            session_id,
            message,
            signal,
            round_result,
            hint,
            media,
            options,
            round_number: session.round_number(),
            total_rounds: session.total_rounds(),
            score: session.score(),
            status: session.status(),
            summary,
            used_fallback,
            updates,
        })
    }

    /// Text to send the generator, and the signal if it is already settled.
    ///
    /// Structured inputs never need the generator to classify them, and a
    /// verbatim answer is correct whatever the generator says.
    fn pre_classify(
        &self,
        record: &SessionRecord,
        item: &QuizItem,
        input: PlayerInput,
    ) -> Result<(String, Option<ClassifiedSignal>), QuizError> {
        let is_answer = |text: &str| normalize(text) == normalize(item.answer());
        Ok(match input {
            PlayerInput::Text(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    ("(no answer)".to_string(), Some(ClassifiedSignal::Unclear))
                } else if is_answer(&text) {
                    (text, Some(ClassifiedSignal::Answer { correct: true }))
                } else {
                    (text, None)
                }
            }
            PlayerInput::Choice(number) => {
                let option = number
                    .checked_sub(1)
                    .and_then(|index| record.current_options.get(index))
                    .ok_or_else(|| {
                        QuizError::InvalidRequest(format!(
                            "option {} is not one of the {} shown",
                            number,
                            record.current_options.len()
                        ))
                    })?;
                let correct = is_answer(option);
                (option.clone(), Some(ClassifiedSignal::Answer { correct }))
            }
            PlayerInput::DontKnow => ("I don't know.".to_string(), Some(ClassifiedSignal::DontKnow)),
            PlayerInput::Skip => ("Skip this one.".to_string(), Some(ClassifiedSignal::Skip)),
            PlayerInput::Continue => ("Continue.".to_string(), Some(ClassifiedSignal::Continue)),
        })
    }

    /// Hand out the next precomputed hint, if the plan has one left.
    fn give_hint(
        &self,
        record: &mut SessionRecord,
        updates: &mut Vec<SessionUpdate>,
    ) -> Result<Option<PrecomputedHint>, QuizError> {
        let used = record.session.hints_used_this_round();
        let Some(hint) = record.current_hints.next_hint(used).cloned() else {
            return Ok(None);
        };
        updates.push(record.session.record_hint(&hint, self.content.rules())?);
        record.transcript.push_tool_result(
            record.session.round_number(),
            "hint",
            hint.text().to_string(),
        );
        Ok(Some(hint))
    }

    fn resolve(
        &self,
        record: &mut SessionRecord,
        item: &QuizItem,
        outcome: RoundOutcome,
        updates: &mut Vec<SessionUpdate>,
    ) -> Result<Resolution, QuizError> {
        let round = record.session.round_number();
        let resolved = record
            .session
            .resolve_round(outcome, self.content.rules(), self.clock.now())?;
        let points_delta = resolved
            .iter()
            .find_map(|update| match update {
                SessionUpdate::RoundResolved { points_delta, .. } => Some(*points_delta),
                _ => None,
            })
            .unwrap_or(0);
        updates.extend(resolved);

        let verdict = match outcome {
            RoundOutcome::Correct => "answered correctly",
            RoundOutcome::Revealed => "revealed",
        };
        record.transcript = self
            .content
            .compactor()
            .compact(
                &record.transcript,
                round,
                format!("Round {}: {} ({})", round, item.answer(), verdict),
            )
            .into_transcript();

        tracing::info!(
            session_id = %record.session.id(),
            round,
            item_id = %item.id(),
            outcome = ?outcome,
            points_delta,
            "Round resolved"
        );

        if record.session.is_finished() {
            return Ok(Resolution {
                outcome,
                round_number: round,
                points_delta,
                advanced: false,
            });
        }

        // The queued item becomes current; its hints were planned a round ago
        let random = self.random.as_ref();
        let lookahead = self
            .content
            .select_lookahead(&record.session, |len| random.gen_index(len));
        let lookahead_hints = lookahead
            .as_ref()
            .map(|s| self.content.plan_hints(s.item_id(), &record.session))
            .transpose()?;
        updates.push(record.session.advance_round(lookahead.as_ref())?);

        record.current_hints = match record.lookahead_hints.take() {
            Some(plan) if plan.item_id() == record.session.current_item() => plan,
            _ => self
                .content
                .plan_hints(record.session.current_item(), &record.session)?,
        };
        record.lookahead_hints = lookahead_hints;

        Ok(Resolution {
            outcome,
            round_number: round,
            points_delta,
            advanced: true,
        })
    }

    fn next_options(
        &self,
        record: &mut SessionRecord,
        turn: Option<&QuizTurn>,
        resolution: Option<&Resolution>,
    ) -> Result<Vec<String>, QuizError> {
        if record.session.is_finished() {
            return Ok(Vec::new());
        }
        let advanced = resolution.is_some_and(|r| r.advanced);
        let item = self.content.item(record.session.current_item())?;
        let random = self.random.as_ref();

        Ok(match turn {
            Some(turn) if advanced || !turn.options.is_empty() => generator_options(
                &self.content,
                &mut record.session,
                item,
                turn.options.clone(),
                random,
            ),
            _ if advanced => catalog_options(&self.content, item, random),
            _ => record.current_options.clone(),
        })
    }

    fn fallback_message(
        &self,
        record: &SessionRecord,
        previous: &QuizItem,
        signal: ClassifiedSignal,
        hint: Option<&PrecomputedHint>,
        resolution: Option<&Resolution>,
    ) -> Result<String, QuizError> {
        let session = &record.session;
        let mut parts = Vec::new();

        match resolution.map(|r| r.outcome) {
            Some(RoundOutcome::Correct) => {
                parts.push(format!("Correct! It was {}.", previous.answer()))
            }
            Some(RoundOutcome::Revealed) => {
                parts.push(format!("The answer was {}.", previous.answer()))
            }
            None if hint.is_some() && !matches!(signal, ClassifiedSignal::Answer { .. }) => {}
            None => parts.push(fallback_reply(signal).to_string()),
        }
        if let Some(hint) = hint {
            parts.push(format!("Hint: {}", hint.text()));
        }

        if session.is_finished() {
            parts.push(format!("That's the end of the quiz! Final score: {}.", session.score()));
        } else if resolution.is_some_and(|r| r.advanced) {
            let item = self.content.item(session.current_item())?;
            let prompt = self.content.category_prompt(item);
            parts.push(fallback_question(
                session.round_number(),
                session.total_rounds(),
                &prompt.question_frame,
                item.opening_clue(),
            ));
        }

        Ok(parts.join(" "))
    }

    async fn find_media(&self, session_id: SessionId, query: &str) -> Option<MediaRef> {
        match self.media.search(query).await {
            Ok(found) => found,
            Err(error) => {
                tracing::debug!(session_id = %session_id, query, error = %error, "Media search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::infrastructure::media::NoMediaSearch;
    use crate::infrastructure::ports::{LlmError, LlmResponse, MockMediaSearchPort};
    use crate::test_fixtures::{
        sample_catalog, test_app, test_app_with, test_settings, turn_response, ScriptedLlm,
    };
    use crate::use_cases::quiz::StartRequest;
    use quizcraft_domain::{AgeBand, Difficulty, FinishReason, ItemId};
    use std::collections::HashSet;

    async fn start(app: &App, total_rounds: u32) -> SessionId {
        app.use_cases
            .quiz
            .start
            .execute(StartRequest {
                difficulty: Difficulty::Easy,
                age_band: AgeBand::Young,
                total_rounds,
                seed: None,
            })
            .await
            .unwrap()
            .session_id
    }

    /// Opening question followed by `turns`.
    fn script(turns: Vec<Result<LlmResponse, LlmError>>) -> Arc<ScriptedLlm> {
        let mut responses = vec![Ok(turn_response(
            "continue",
            None,
            "Which animal am I?",
            &["Koala", "Emu", "Wombat", "Axolotl"],
        ))];
        responses.extend(turns);
        Arc::new(ScriptedLlm::new(responses))
    }

    async fn submit(app: &App, id: SessionId, input: PlayerInput) -> TurnOutcome {
        app.use_cases.quiz.submit.execute(id, input).await.unwrap()
    }

    fn text(s: &str) -> PlayerInput {
        PlayerInput::Text(s.to_string())
    }

    #[tokio::test]
    async fn correct_answer_scores_and_advances() {
        let llm = script(vec![Ok(turn_response(
            "answer",
            Some(true),
            "Yes, a koala! Now, where am I?",
            &["Paris", "Kyoto", "Rome"],
        ))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, text("koala")).await;

        let result = outcome.round_result.as_ref().unwrap();
        assert!(result.correct);
        assert_eq!(result.points_delta, 10);
        assert_eq!(result.answer, "Koala");
        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.round_number, 2);
        assert_eq!(outcome.status, SessionStatus::AwaitingAnswer);
        assert_eq!(outcome.message, "Yes, a koala! Now, where am I?");
        assert_eq!(outcome.options, vec!["Paris", "Kyoto", "Rome"]);
        assert!(!outcome.used_fallback);
        assert_eq!(
            outcome.status_trail(),
            vec![SessionStatus::RoundComplete, SessionStatus::AwaitingAnswer]
        );
    }

    #[tokio::test]
    async fn verbatim_answer_wins_over_generator_verdict() {
        let llm = script(vec![Ok(turn_response("answer", Some(false), "Nope!", &[]))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, text("  KOALA ")).await;

        assert_eq!(outcome.signal, ClassifiedSignal::Answer { correct: true });
        assert!(outcome.round_result.unwrap().correct);
        // Generator disagreed, so the reply is built locally
        assert!(outcome.used_fallback);
        assert!(outcome.message.starts_with("Correct! It was Koala."));
        assert!(outcome.options.contains(&"Paris".to_string()));
    }

    #[tokio::test]
    async fn choice_is_checked_against_shown_options() {
        let llm = script(vec![Ok(turn_response("answer", Some(true), "Correct!", &[]))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        // Option 2 is "Emu"; the generator's claim is ignored
        let outcome = submit(&app, id, PlayerInput::Choice(2)).await;

        assert_eq!(outcome.signal, ClassifiedSignal::Answer { correct: false });
        assert!(outcome.round_result.is_none());
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.round_number, 1);
        assert_eq!(outcome.options, vec!["Koala", "Emu", "Wombat", "Axolotl"]);
    }

    #[tokio::test]
    async fn out_of_range_choice_is_rejected_without_changes() {
        let llm = script(vec![]);
        let app = test_app(llm.clone());
        let id = start(&app, 3).await;

        let result = app.use_cases.quiz.submit.execute(id, PlayerInput::Choice(9)).await;
        assert!(matches!(result, Err(QuizError::InvalidRequest(_))));
        let result = app.use_cases.quiz.submit.execute(id, PlayerInput::Choice(0)).await;
        assert!(matches!(result, Err(QuizError::InvalidRequest(_))));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn dont_know_gives_hints_then_reveals() {
        let llm = script(vec![
            Ok(turn_response("dont_know", None, "Here's a hint!", &[])),
            Ok(turn_response("dont_know", None, "Another hint!", &[])),
            Ok(turn_response("dont_know", None, "It was a koala.", &[])),
        ]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let first = submit(&app, id, PlayerInput::DontKnow).await;
        assert_eq!(first.hint.as_ref().unwrap().hint_number(), 1);
        assert_eq!(first.status, SessionStatus::HintGiven { count: 1 });
        assert_eq!(first.score, 0);

        let second = submit(&app, id, PlayerInput::DontKnow).await;
        assert_eq!(second.hint.as_ref().unwrap().hint_number(), 2);
        assert_eq!(second.status, SessionStatus::HintGiven { count: 2 });

        let third = submit(&app, id, PlayerInput::DontKnow).await;
        assert!(third.hint.is_none());
        let result = third.round_result.unwrap();
        assert!(!result.correct);
        assert_eq!(result.points_delta, 0);
        assert_eq!(third.round_number, 2);
        assert_eq!(third.score, 0);
    }

    #[tokio::test]
    async fn skip_before_budget_is_spent_gives_a_hint() {
        let llm = script(vec![Ok(turn_response("skip", None, "Try this hint first.", &[]))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, PlayerInput::Skip).await;

        assert!(outcome.hint.is_some());
        assert!(outcome.round_result.is_none());
        assert_eq!(outcome.round_number, 1);
    }

    #[tokio::test]
    async fn hint_deductions_reduce_round_award() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(turn_response("continue", None, "Which animal am I?", &[])),
            Ok(turn_response("dont_know", None, "Hint!", &[])),
            Ok(turn_response("dont_know", None, "Hint!", &[])),
            Ok(turn_response("answer", Some(true), "Yes!", &[])),
        ]));
        let app = test_app(llm);
        let started = app
            .use_cases
            .quiz
            .start
            .execute(StartRequest {
                difficulty: Difficulty::Hard,
                age_band: AgeBand::Adult,
                total_rounds: 3,
                seed: None,
            })
            .await
            .unwrap();
        let answer = started.bundle.current_item.answer.clone();

        submit(&app, started.session_id, PlayerInput::DontKnow).await;
        submit(&app, started.session_id, PlayerInput::DontKnow).await;
        let outcome = submit(&app, started.session_id, text(&answer)).await;

        assert_eq!(outcome.round_result.unwrap().points_delta, 11);
        assert_eq!(outcome.score, 11);
    }

    #[tokio::test]
    async fn unclear_input_changes_nothing() {
        let llm = script(vec![Ok(turn_response("unclear", None, "Could you say that again?", &[]))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, text("hmm maybe")).await;

        assert_eq!(outcome.signal, ClassifiedSignal::Unclear);
        assert!(outcome.updates.is_empty());
        assert_eq!(outcome.status, SessionStatus::AwaitingAnswer);
        assert_eq!(outcome.message, "Could you say that again?");
    }

    #[tokio::test]
    async fn malformed_output_leaves_session_untouched() {
        let llm = script(vec![
            Ok(LlmResponse::text("I think that is right")),
            Ok(LlmResponse::text("Still no tool call")),
        ]);
        let app = test_app(llm);
        let id = start(&app, 3).await;
        let before = app.use_cases.quiz.summary.execute(id).await.unwrap();

        let result = app.use_cases.quiz.submit.execute(id, text("a bear")).await;
        assert!(matches!(result, Err(QuizError::TryAgain(_))));

        let after = app.use_cases.quiz.summary.execute(id).await.unwrap();
        assert_eq!(before, after);
        let handle = app.store.get(id).unwrap();
        let record = handle.lock().await;
        assert_eq!(record.session.round_number(), 1);
        assert_eq!(record.session.wrong_guesses_this_round(), 0);
        assert_eq!(record.transcript.entries().len(), 1);
    }

    #[tokio::test]
    async fn malformed_output_with_structured_input_still_plays() {
        let llm = script(vec![
            Ok(LlmResponse::text("garbage")),
            Ok(LlmResponse::text("more garbage")),
        ]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, PlayerInput::DontKnow).await;
        assert!(outcome.used_fallback);
        assert!(outcome.hint.is_some());
        assert!(outcome.message.starts_with("Hint: "));
    }

    #[tokio::test]
    async fn offline_generator_uses_local_classification() {
        let app = test_app(Arc::new(ScriptedLlm::offline()));
        let id = start(&app, 2).await;

        let wrong = submit(&app, id, text("wombat")).await;
        assert_eq!(wrong.signal, ClassifiedSignal::Answer { correct: false });
        assert_eq!(wrong.message, "Not quite. Try again!");

        let hint = submit(&app, id, text("no idea, give me a hint")).await;
        assert_eq!(hint.signal, ClassifiedSignal::DontKnow);
        assert!(hint.hint.is_some());

        let right = submit(&app, id, text("Koala")).await;
        assert!(right.used_fallback);
        assert!(right.message.contains("Round 2 of 2."));
        assert_eq!(right.options.len(), 4);
        assert!(right.options.contains(&"Paris".to_string()));
    }

    #[tokio::test]
    async fn final_round_finishes_with_bonus() {
        let llm = script(vec![
            Ok(turn_response("answer", Some(true), "Right! Next one.", &["Paris", "Rome"])),
            Ok(turn_response("answer", Some(true), "Perfect game!", &[])),
        ]);
        let app = test_app(llm);
        let id = start(&app, 2).await;

        submit(&app, id, text("Koala")).await;
        let last = submit(&app, id, text("Paris")).await;

        assert_eq!(last.status, SessionStatus::Finished);
        assert_eq!(
            last.status_trail(),
            vec![SessionStatus::RoundComplete, SessionStatus::Finished]
        );
        assert!(last.options.is_empty());
        let summary = last.summary.unwrap();
        assert_eq!(summary.score, 10 + 10 + 25);
        assert_eq!(summary.bonus_earned, 25);
        assert_eq!(summary.correct_count, 2);
        assert_eq!(summary.finish_reason, Some(FinishReason::Completed));

        assert!(app.store.get(id).is_none());
        assert!(matches!(
            app.use_cases.quiz.submit.execute(id, text("again")).await,
            Err(QuizError::SessionFinished(_))
        ));
    }

    #[tokio::test]
    async fn generator_options_are_repaired_after_advance() {
        let llm = script(vec![Ok(turn_response(
            "answer",
            Some(true),
            "Yes! Where am I?",
            &["Rome", "Oslo"],
        ))]);
        let app = test_app(llm);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, text("Koala")).await;

        assert_eq!(outcome.options.len(), 3);
        assert!(outcome.options.contains(&"Paris".to_string()));
        let summary = app.use_cases.quiz.summary.execute(id).await.unwrap();
        assert_eq!(summary.compliance_failures, 1);
    }

    #[tokio::test]
    async fn hint_media_is_looked_up() {
        let mut media = MockMediaSearchPort::new();
        media
            .expect_search()
            .withf(|query| query.contains("koala"))
            .returning(|_| {
                Ok(Some(MediaRef {
                    url: "https://example.org/koala.jpg".to_string(),
                    attribution: None,
                }))
            });
        let llm = script(vec![Ok(turn_response("dont_know", None, "Here's a hint!", &[]))]);
        let app = test_app_with(llm, Arc::new(media), test_settings());
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, PlayerInput::DontKnow).await;

        assert_eq!(
            outcome.hint.unwrap().media_query(),
            Some("koala in a eucalyptus tree")
        );
        assert_eq!(outcome.media.unwrap().url, "https://example.org/koala.jpg");
    }

    #[tokio::test]
    async fn wrong_answer_can_attach_a_hint() {
        let mut settings = test_settings();
        settings.hint_on_wrong_answer = true;
        let llm = script(vec![Ok(turn_response("answer", Some(false), "Not quite!", &[]))]);
        let app = test_app_with(llm, Arc::new(NoMediaSearch), settings);
        let id = start(&app, 3).await;

        let outcome = submit(&app, id, text("emu")).await;

        assert!(outcome.hint.is_some());
        assert_eq!(outcome.status, SessionStatus::HintGiven { count: 1 });
        assert_eq!(outcome.message, "Not quite!");
    }

    /// Play a seeded session to the end with verbatim answers.
    /// Returns the items in play order and the session's used ids at the end.
    async fn play_seeded(seed: u64, total_rounds: u32) -> (Vec<ItemId>, Vec<ItemId>) {
        let app = test_app(Arc::new(ScriptedLlm::offline()));
        let id = app
            .use_cases
            .quiz
            .start
            .execute(StartRequest {
                difficulty: Difficulty::Easy,
                age_band: AgeBand::Young,
                total_rounds,
                seed: Some(seed),
            })
            .await
            .unwrap()
            .session_id;
        let handle = app.store.get(id).unwrap();

        let mut played = Vec::new();
        for round in 1..=total_rounds {
            let (item, answer) = {
                let record = handle.lock().await;
                let item = record.session.current_item().clone();
                let answer = app.content.item(&item).unwrap().answer().to_string();
                (item, answer)
            };
            played.push(item);
            let outcome = submit(&app, id, text(&answer)).await;
            assert_eq!(outcome.summary.is_some(), round == total_rounds, "round {round}");
        }

        let used = handle.lock().await.session.used_item_ids().to_vec();
        (played, used)
    }

    #[tokio::test]
    async fn seeded_sessions_replay_without_repeating_items() {
        let total_rounds = sample_catalog().len() as u32;
        for seed in 0..20 {
            let (first, used) = play_seeded(seed, total_rounds).await;
            let (second, _) = play_seeded(seed, total_rounds).await;

            assert_eq!(first, second, "seed {seed}");
            assert_eq!(used, first, "seed {seed}");
            let unique: HashSet<&ItemId> = used.iter().collect();
            assert_eq!(unique.len(), total_rounds as usize, "seed {seed}");
        }
    }

    #[tokio::test]
    async fn unknown_session() {
        let app = test_app(Arc::new(ScriptedLlm::offline()));
        let result = app
            .use_cases
            .quiz
            .submit
            .execute(SessionId::new(), PlayerInput::Continue)
            .await;
        assert!(matches!(result, Err(QuizError::SessionNotFound(_))));
    }
}
