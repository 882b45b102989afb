//! Quizcraft domain: the pure rules of an adaptive quiz.
//!
//! Nothing in this crate performs I/O or reads the clock or an RNG on its
//! own; time and randomness are passed in by the engine.

pub mod aggregates;
pub mod answers;
pub mod catalog;
pub mod categories;
pub mod error;
pub mod events;
pub mod hints;
pub mod ids;
pub mod selection;
pub mod value_objects;

pub use aggregates::{QuizSession, SessionSettings, SessionStatus, SessionSummary};
pub use answers::{validate_options, AnswerSetValidator, OptionRepair, ValidatedOptions, MIN_OPTIONS};
pub use catalog::{normalize, ContentCatalog, QuizItem};
pub use categories::{CategoryPrompt, CategoryRegistry, CategoryStrategy, TableStrategy};
pub use error::DomainError;
pub use events::{FinishReason, RoundOutcome, SessionUpdate};
pub use hints::{HintPlan, HintPlanner, HintSource, PrecomputedHint};
pub use ids::{ItemId, SessionId};
pub use selection::{ItemSelector, Selection, SelectionRequest};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{
    target_tier, AgeBand, CategoryTag, CompactionResult, Difficulty, DifficultyTable, DisplayName,
    FameTier, HistoryCompactor, ScoringRules, TierSchedule, Transcript, TranscriptEntry,
    TranscriptEntryKind, TranscriptRole,
};
