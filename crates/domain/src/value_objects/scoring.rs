//! Scoring rules: base reward, hint cost schedule and completion bonus.
//!
//! All scoring is table lookups on the session difficulty. Nothing here is
//! ever computed by the external generator, which keeps a session's score
//! auditable from its hint count and round outcomes alone.

use serde::{Deserialize, Serialize};

use crate::value_objects::Difficulty;

/// A value per difficulty setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable<T> {
    pub easy: T,
    pub medium: T,
    pub hard: T,
}

impl<T: Copy> DifficultyTable<T> {
    pub fn get(&self, difficulty: Difficulty) -> T {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points for a correctly answered round before hint deductions
    pub base_points: DifficultyTable<u32>,
    /// Deduction per hint taken
    pub hint_costs: DifficultyTable<u32>,
    /// Added exactly once when the final round resolves
    pub completion_bonus: u32,
    /// Hint budget per round
    pub max_hints_per_round: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_points: DifficultyTable {
                easy: 10,
                medium: 12,
                hard: 15,
            },
            hint_costs: DifficultyTable {
                easy: 0,
                medium: 1,
                hard: 2,
            },
            completion_bonus: 25,
            max_hints_per_round: 2,
        }
    }
}

impl ScoringRules {
    pub fn base_points(&self, difficulty: Difficulty) -> u32 {
        self.base_points.get(difficulty)
    }

    pub fn hint_cost(&self, difficulty: Difficulty) -> u32 {
        self.hint_costs.get(difficulty)
    }

    /// Points awarded for a correct round after `deductions`, floored at zero.
    pub fn round_award(&self, difficulty: Difficulty, deductions: u32) -> u32 {
        self.base_points(difficulty).saturating_sub(deductions)
    }
}
