//! Quiz use cases.
//!
//! A session is played as a strictly sequential stream of turns:
//! 1. StartSession picks the first two items, asks the generator for the
//!    opening question and stores the session
//! 2. SubmitTurn classifies the player's input, applies it to the session
//!    and returns the host's reply with the next options or hint
//! 3. EndSession stops the game early; GetSummary reads the result
//!
//! Every turn works on a clone of the stored record and commits it only
//! once the whole turn succeeded.

use std::sync::Arc;

mod content;
mod end;
mod fallback;
mod generator;
mod options;
mod prompt;
mod start;
mod submit;
mod summary;

pub use content::{QuizContent, TurnPolicy};
pub use end::EndSession;
pub use fallback::{classify_locally, fallback_question, fallback_reply};
pub use generator::{GeneratorOutcome, TurnGenerator};
pub use prompt::{transcript_messages, PromptAssembler};
pub use start::{SessionStarted, StartRequest, StartSession};
pub use submit::{PlayerInput, RoundResult, SubmitTurn, TurnOutcome};
pub use summary::GetSummary;

use quizcraft_domain::{DomainError, SessionId};

/// Container for quiz use cases.
pub struct QuizUseCases {
    pub start: Arc<StartSession>,
    pub submit: Arc<SubmitTurn>,
    pub end: Arc<EndSession>,
    pub summary: Arc<GetSummary>,
}

impl QuizUseCases {
    pub fn new(
        start: Arc<StartSession>,
        submit: Arc<SubmitTurn>,
        end: Arc<EndSession>,
        summary: Arc<GetSummary>,
    ) -> Self {
        Self {
            start,
            submit,
            end,
            summary,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("Session already finished: {0}")]
    SessionFinished(SessionId),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The generator kept producing unusable output; nothing was changed
    #[error("Please try again ({0})")]
    TryAgain(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}
