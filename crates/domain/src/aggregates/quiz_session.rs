//! QuizSession aggregate - the state of one player's quiz game
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: score, round and hint counters only change through
//!   the transition methods below
//! - **Explicit state machine**: every status change goes through
//!   `SessionStatus::can_transition_to`
//! - **Mutation outcomes**: transitions return `SessionUpdate` values
//!
//! The aggregate never talks to the generator. Callers feed it already
//! classified signals, and only after the generator's output was validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{FinishReason, RoundOutcome, SessionUpdate};
use crate::hints::PrecomputedHint;
use crate::ids::{ItemId, SessionId};
use crate::selection::Selection;
use crate::value_objects::{AgeBand, Difficulty, ScoringRules};

/// Round lifecycle status.
///
/// `AwaitingAnswer -> HintGiven* -> RoundComplete -> (AwaitingAnswer | Finished)`;
/// any live status may jump to `Finished` on termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingAnswer,
    HintGiven { count: u32 },
    RoundComplete,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingAnswer => "awaiting_answer",
            Self::HintGiven { .. } => "hint_given",
            Self::RoundComplete => "round_complete",
            Self::Finished => "finished",
        }
    }

    /// Whether player input can be applied in this status
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::AwaitingAnswer | Self::HintGiven { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    pub fn can_transition_to(&self, next: &SessionStatus) -> bool {
        match (self, next) {
            (Self::Finished, _) => false,
            (_, Self::Finished) => true,
            (Self::AwaitingAnswer, Self::HintGiven { count }) => *count == 1,
            (Self::HintGiven { count: from }, Self::HintGiven { count: to }) => *to == from + 1,
            (Self::AwaitingAnswer | Self::HintGiven { .. }, Self::RoundComplete) => true,
            (Self::RoundComplete, Self::AwaitingAnswer) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HintGiven { count } => write!(f, "hint_given({count})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Calibration chosen at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    difficulty: Difficulty,
    age_band: AgeBand,
    total_rounds: u32,
    seed: Option<u64>,
}

impl SessionSettings {
    /// # Errors
    ///
    /// `DomainError::Validation` if `total_rounds` is zero.
    pub fn new(difficulty: Difficulty, age_band: AgeBand, total_rounds: u32) -> Result<Self, DomainError> {
        if total_rounds == 0 {
            return Err(DomainError::validation("A session needs at least one round"));
        }
        Ok(Self {
            difficulty,
            age_band,
            total_rounds,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn age_band(&self) -> AgeBand {
        self.age_band
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Snapshot archived when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub score: u32,
    pub correct_count: u32,
    pub total_rounds: u32,
    pub rounds_played: u32,
    pub hints_used: u32,
    pub duration_ms: u64,
    pub bonus_earned: u32,
    pub compliance_failures: u32,
    pub finish_reason: Option<FinishReason>,
}

/// One quiz game.
///
/// # Invariants
///
/// - `used_item_ids` has no duplicates and holds `current_item` only once
///   its round resolved
/// - `round_number <= total_rounds`
/// - `Finished` is terminal; the completion bonus is added at most once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    id: SessionId,
    settings: SessionSettings,
    round_number: u32,
    score: u32,
    used_item_ids: Vec<ItemId>,
    current_item: ItemId,
    current_review_mode: bool,
    next_item: Option<ItemId>,
    next_review_mode: bool,
    hints_used_this_round: u32,
    round_deductions: u32,
    wrong_guesses_this_round: u32,
    status: SessionStatus,

    // Running totals for the summary
    rounds_resolved: u32,
    correct_count: u32,
    hints_used_total: u32,
    bonus_earned: u32,
    compliance_failures: u32,

    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    finish_reason: Option<FinishReason>,
}

impl QuizSession {
    /// Start a session at round 1.
    ///
    /// `next` is the look-ahead pick for round 2 (`None` for one-round games).
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use quizcraft_domain::aggregates::{QuizSession, SessionSettings, SessionStatus};
    /// use quizcraft_domain::selection::Selection;
    /// use quizcraft_domain::value_objects::{AgeBand, Difficulty, FameTier};
    /// use quizcraft_domain::{ItemId, SessionId};
    ///
    /// let settings = SessionSettings::new(Difficulty::Easy, AgeBand::Young, 3).unwrap();
    /// let first = Selection::new(ItemId::new("koala").unwrap(), FameTier::Common, false);
    /// let session = QuizSession::start(SessionId::new(), settings, &first, None, Utc::now());
    ///
    /// assert_eq!(session.round_number(), 1);
    /// assert_eq!(session.status(), SessionStatus::AwaitingAnswer);
    /// ```
    pub fn start(
        id: SessionId,
        settings: SessionSettings,
        current: &Selection,
        next: Option<&Selection>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            settings,
            round_number: 1,
            score: 0,
            used_item_ids: Vec::new(),
            current_item: current.item_id().clone(),
            current_review_mode: current.is_review_mode(),
            next_item: next.map(|s| s.item_id().clone()),
            next_review_mode: next.is_some_and(Selection::is_review_mode),
            hints_used_this_round: 0,
            round_deductions: 0,
            wrong_guesses_this_round: 0,
            status: SessionStatus::AwaitingAnswer,
            rounds_resolved: 0,
            correct_count: 0,
            hints_used_total: 0,
            bonus_earned: 0,
            compliance_failures: 0,
            started_at: now,
            finished_at: None,
            finish_reason: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn difficulty(&self) -> Difficulty {
        self.settings.difficulty
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn total_rounds(&self) -> u32 {
        self.settings.total_rounds
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn used_item_ids(&self) -> &[ItemId] {
        &self.used_item_ids
    }

    pub fn current_item(&self) -> &ItemId {
        &self.current_item
    }

    pub fn is_review_round(&self) -> bool {
        self.current_review_mode
    }

    pub fn next_item(&self) -> Option<&ItemId> {
        self.next_item.as_ref()
    }

    pub fn hints_used_this_round(&self) -> u32 {
        self.hints_used_this_round
    }

    /// Sum of hint deductions charged against this round's reward
    pub fn round_deductions(&self) -> u32 {
        self.round_deductions
    }

    pub fn wrong_guesses_this_round(&self) -> u32 {
        self.wrong_guesses_this_round
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn bonus_earned(&self) -> u32 {
        self.bonus_earned
    }

    pub fn compliance_failures(&self) -> u32 {
        self.compliance_failures
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn hint_budget_exhausted(&self, rules: &ScoringRules) -> bool {
        self.hints_used_this_round >= rules.max_hints_per_round
    }

    /// Round number the look-ahead item must be selected for once the
    /// current round resolves, if another look-ahead is needed at all.
    pub fn lookahead_round(&self) -> Option<u32> {
        let upcoming = self.round_number + 2;
        (upcoming <= self.settings.total_rounds).then_some(upcoming)
    }

    /// Items a look-ahead selection must avoid: everything used plus the
    /// item queued for the next round.
    pub fn lookahead_exclusions(&self) -> Vec<ItemId> {
        let mut excluded = self.used_item_ids.clone();
        if self.status.accepts_input() && !excluded.contains(&self.current_item) {
            excluded.push(self.current_item.clone());
        }
        if let Some(next) = &self.next_item {
            if !excluded.contains(next) {
                excluded.push(next.clone());
            }
        }
        excluded
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn transition(&mut self, next: SessionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&next) {
            return Err(DomainError::invalid_state_transition(format!(
                "{} -> {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    fn require_input_state(&self) -> Result<(), DomainError> {
        if self.status.accepts_input() {
            Ok(())
        } else {
            Err(DomainError::invalid_state_transition(format!(
                "session {} does not accept input while {}",
                self.id, self.status
            )))
        }
    }

    /// Give the player a hint and charge its deduction against the round.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` outside a live round
    /// - `Constraint` when the hint budget is spent
    /// - `Validation` when the hint belongs to another item
    pub fn record_hint(
        &mut self,
        hint: &PrecomputedHint,
        rules: &ScoringRules,
    ) -> Result<SessionUpdate, DomainError> {
        self.require_input_state()?;
        if self.hint_budget_exhausted(rules) {
            return Err(DomainError::constraint(format!(
                "hint budget of {} already used this round",
                rules.max_hints_per_round
            )));
        }
        if hint.item_id() != &self.current_item {
            return Err(DomainError::validation(format!(
                "hint for {} does not match current item {}",
                hint.item_id(),
                self.current_item
            )));
        }

        let count = self.hints_used_this_round + 1;
        self.transition(SessionStatus::HintGiven { count })?;
        self.hints_used_this_round = count;
        self.hints_used_total += 1;
        self.round_deductions += hint.points_deduction();

        Ok(SessionUpdate::HintRecorded {
            round_number: self.round_number,
            hint_number: count,
            points_deduction: hint.points_deduction(),
        })
    }

    /// A wrong guess. Score and status stay as they are.
    pub fn record_incorrect(&mut self) -> Result<SessionUpdate, DomainError> {
        self.require_input_state()?;
        self.wrong_guesses_this_round += 1;
        Ok(SessionUpdate::IncorrectGuess {
            round_number: self.round_number,
            wrong_guesses: self.wrong_guesses_this_round,
        })
    }

    /// Resolve the current round.
    ///
    /// A correct round awards the base reward minus this round's hint
    /// deductions, floored at zero; a revealed round awards nothing. On the
    /// final round the session finishes and the completion bonus is added.
    pub fn resolve_round(
        &mut self,
        outcome: RoundOutcome,
        rules: &ScoringRules,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionUpdate>, DomainError> {
        self.require_input_state()?;
        self.transition(SessionStatus::RoundComplete)?;

        let points_delta = match outcome {
            RoundOutcome::Correct => {
                self.correct_count += 1;
                rules.round_award(self.settings.difficulty, self.round_deductions)
            }
            RoundOutcome::Revealed => 0,
        };
        self.score += points_delta;
        self.rounds_resolved += 1;
        if !self.used_item_ids.contains(&self.current_item) {
            self.used_item_ids.push(self.current_item.clone());
        }

        let mut updates = vec![SessionUpdate::RoundResolved {
            round_number: self.round_number,
            item_id: self.current_item.clone(),
            outcome,
            points_delta,
            score: self.score,
        }];

        if self.round_number >= self.settings.total_rounds {
            self.transition(SessionStatus::Finished)?;
            self.bonus_earned = rules.completion_bonus;
            self.score += rules.completion_bonus;
            self.finished_at = Some(now);
            self.finish_reason = Some(FinishReason::Completed);
            updates.push(SessionUpdate::Finished {
                reason: FinishReason::Completed,
                bonus_awarded: rules.completion_bonus,
                score: self.score,
            });
        }

        Ok(updates)
    }

    /// Move a completed round on to the queued item.
    ///
    /// `lookahead` is the item for the round after that, selected with
    /// `lookahead_exclusions()` for `lookahead_round()`.
    pub fn advance_round(&mut self, lookahead: Option<&Selection>) -> Result<SessionUpdate, DomainError> {
        if self.status != SessionStatus::RoundComplete {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot advance while {}",
                self.status
            )));
        }
        let Some(next) = self.next_item.take() else {
            return Err(DomainError::invalid_state_transition(
                "no item queued for the next round",
            ));
        };
        self.transition(SessionStatus::AwaitingAnswer)?;

        self.current_item = next;
        self.current_review_mode = self.next_review_mode;
        self.next_item = lookahead.map(|s| s.item_id().clone());
        self.next_review_mode = lookahead.is_some_and(Selection::is_review_mode);
        self.round_number += 1;
        self.hints_used_this_round = 0;
        self.round_deductions = 0;
        self.wrong_guesses_this_round = 0;

        Ok(SessionUpdate::RoundAdvanced {
            round_number: self.round_number,
            item_id: self.current_item.clone(),
            review_mode: self.current_review_mode,
        })
    }

    /// Finish immediately. Returns `None` if the session already finished.
    pub fn terminate(&mut self, now: DateTime<Utc>) -> Option<SessionUpdate> {
        if self.is_finished() {
            return None;
        }
        self.status = SessionStatus::Finished;
        self.finished_at = Some(now);
        self.finish_reason = Some(FinishReason::Terminated);
        Some(SessionUpdate::Finished {
            reason: FinishReason::Terminated,
            bonus_awarded: 0,
            score: self.score,
        })
    }

    /// Count a generator output that had to be repaired.
    pub fn note_compliance_failure(&mut self) {
        self.compliance_failures += 1;
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let end = self.finished_at.unwrap_or(now);
        let duration_ms = (end - self.started_at).num_milliseconds().max(0) as u64;
        SessionSummary {
            session_id: self.id,
            score: self.score,
            correct_count: self.correct_count,
            total_rounds: self.settings.total_rounds,
            rounds_played: self.rounds_resolved,
            hints_used: self.hints_used_total,
            duration_ms,
            bonus_earned: self.bonus_earned,
            compliance_failures: self.compliance_failures,
            finish_reason: self.finish_reason,
        }
    }
}
