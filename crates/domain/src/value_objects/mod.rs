//! Value objects - immutable, validated building blocks of the quiz domain.

mod calibration;
mod names;
mod scoring;
mod transcript;

pub use calibration::{target_tier, AgeBand, Difficulty, FameTier, TierSchedule};
pub use names::{CategoryTag, DisplayName};
pub use scoring::{DifficultyTable, ScoringRules};
pub use transcript::{
    CompactionResult, HistoryCompactor, Transcript, TranscriptEntry, TranscriptEntryKind,
    TranscriptRole,
};
