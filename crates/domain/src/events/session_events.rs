//! Quiz session mutation outcomes.

use serde::{Deserialize, Serialize};

use crate::aggregates::SessionStatus;
use crate::ids::ItemId;

/// How a round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Player named the item
    Correct,
    /// Player gave up after the hint budget was spent; no points
    Revealed,
}

/// Why a session reached `finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Final round resolved
    Completed,
    /// Ended from outside before the final round
    Terminated,
}

/// Outcome of a session mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    HintRecorded {
        round_number: u32,
        hint_number: u32,
        points_deduction: u32,
    },
    IncorrectGuess {
        round_number: u32,
        wrong_guesses: u32,
    },
    RoundResolved {
        round_number: u32,
        item_id: ItemId,
        outcome: RoundOutcome,
        points_delta: u32,
        score: u32,
    },
    RoundAdvanced {
        round_number: u32,
        item_id: ItemId,
        review_mode: bool,
    },
    Finished {
        reason: FinishReason,
        bonus_awarded: u32,
        score: u32,
    },
}

impl SessionUpdate {
    /// Status the session holds right after this update, if it changed it.
    pub fn resulting_status(&self) -> Option<SessionStatus> {
        match self {
            Self::HintRecorded { hint_number, .. } => Some(SessionStatus::HintGiven {
                count: *hint_number,
            }),
            Self::IncorrectGuess { .. } => None,
            Self::RoundResolved { .. } => Some(SessionStatus::RoundComplete),
            Self::RoundAdvanced { .. } => Some(SessionStatus::AwaitingAnswer),
            Self::Finished { .. } => Some(SessionStatus::Finished),
        }
    }
}
