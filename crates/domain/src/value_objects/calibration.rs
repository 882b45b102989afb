//! Difficulty calibration: difficulty setting, player age band, fame tiers,
//! and the lookup table that maps them (plus the round number) to a target tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Session difficulty chosen at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(DomainError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Age band of the player, used to keep content and tone age-appropriate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// Roughly 6-9 years
    Young,
    /// Roughly 10-14 years
    Teen,
    Adult,
}

impl AgeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Young => "young",
            Self::Teen => "teen",
            Self::Adult => "adult",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeBand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "young" => Ok(Self::Young),
            "teen" => Ok(Self::Teen),
            "adult" => Ok(Self::Adult),
            other => Err(DomainError::parse(format!("Unknown age band: {}", other))),
        }
    }
}

/// Coarse fame bucket of a catalog item; doubles as its difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FameTier {
    Common,
    Familiar,
    Obscure,
}

impl FameTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Familiar => "familiar",
            Self::Obscure => "obscure",
        }
    }
}

impl fmt::Display for FameTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FameTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "familiar" => Ok(Self::Familiar),
            "obscure" => Ok(Self::Obscure),
            other => Err(DomainError::parse(format!("Unknown fame tier: {}", other))),
        }
    }
}

// ============================================================================
// Tier schedule
// ============================================================================

/// Round thresholds at which a (difficulty, age band) pair moves up a tier.
///
/// `None` means the tier is never reached for that pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSchedule {
    pub familiar_from_round: Option<u32>,
    pub obscure_from_round: Option<u32>,
}

impl TierSchedule {
    const fn new(familiar_from_round: Option<u32>, obscure_from_round: Option<u32>) -> Self {
        Self {
            familiar_from_round,
            obscure_from_round,
        }
    }

    /// Lookup table keyed by (difficulty, age band).
    ///
    /// Younger bands and easier settings stay on `common` longer; harder
    /// settings reach `obscure` sooner.
    pub fn for_settings(difficulty: Difficulty, age_band: AgeBand) -> Self {
        match (difficulty, age_band) {
            (Difficulty::Easy, AgeBand::Young) => Self::new(None, None),
            (Difficulty::Easy, AgeBand::Teen) => Self::new(Some(4), None),
            (Difficulty::Easy, AgeBand::Adult) => Self::new(Some(3), None),
            (Difficulty::Medium, AgeBand::Young) => Self::new(Some(4), None),
            (Difficulty::Medium, AgeBand::Teen) => Self::new(Some(3), Some(7)),
            (Difficulty::Medium, AgeBand::Adult) => Self::new(Some(2), Some(5)),
            (Difficulty::Hard, AgeBand::Young) => Self::new(Some(3), None),
            (Difficulty::Hard, AgeBand::Teen) => Self::new(Some(2), Some(4)),
            (Difficulty::Hard, AgeBand::Adult) => Self::new(Some(1), Some(2)),
        }
    }

    pub fn tier_for_round(&self, round_number: u32) -> FameTier {
        let reached = |threshold: Option<u32>| threshold.is_some_and(|from| round_number >= from);
        if reached(self.obscure_from_round) {
            FameTier::Obscure
        } else if reached(self.familiar_from_round) {
            FameTier::Familiar
        } else {
            FameTier::Common
        }
    }
}

/// Target fame tier for a round given the session calibration.
pub fn target_tier(difficulty: Difficulty, age_band: AgeBand, round_number: u32) -> FameTier {
    TierSchedule::for_settings(difficulty, age_band).tier_for_round(round_number)
}
