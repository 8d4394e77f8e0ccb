//! Regime classifier.
//!
//! Maps the probability score onto five ordered market phases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Market phase derived from the probability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegimeState {
    /// Score < 30.
    #[serde(rename = "PANIC")]
    Panic,
    /// Score 30-49.
    #[serde(rename = "TRANSITION")]
    Transition,
    /// Score 50-69.
    #[serde(rename = "EARLY_PHASE_1")]
    EarlyPhase1,
    /// Score 70-84.
    #[serde(rename = "CONFIRMED_PHASE_1")]
    ConfirmedPhase1,
    /// Score >= 85.
    #[serde(rename = "LATE_PHASE_1")]
    LatePhase1,
}

impl RegimeState {
    /// All regimes in score order.
    pub const ALL: [RegimeState; 5] = [
        Self::Panic,
        Self::Transition,
        Self::EarlyPhase1,
        Self::ConfirmedPhase1,
        Self::LatePhase1,
    ];

    /// Whether entering this regime warrants a phase alert.
    pub fn is_alertable(&self) -> bool {
        matches!(
            self,
            Self::Transition | Self::EarlyPhase1 | Self::ConfirmedPhase1
        )
    }

    /// Whether new option entries make sense in this regime.
    pub fn favors_entry(&self) -> bool {
        matches!(self, Self::EarlyPhase1 | Self::ConfirmedPhase1)
    }

    /// Wire name, as persisted and shown in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "PANIC",
            Self::Transition => "TRANSITION",
            Self::EarlyPhase1 => "EARLY_PHASE_1",
            Self::ConfirmedPhase1 => "CONFIRMED_PHASE_1",
            Self::LatePhase1 => "LATE_PHASE_1",
        }
    }

    /// Description of the regime.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Panic => "Volatility expanding, no reversion signal",
            Self::Transition => "Mixed signals, volatility stabilising",
            Self::EarlyPhase1 => "Early mean-reversion",
            Self::ConfirmedPhase1 => "Confirmed mean-reversion",
            Self::LatePhase1 => "Mature mean-reversion, move mostly priced",
        }
    }
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegimeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown regime: {}", s))
    }
}

/// Lower score bound of each regime above `Panic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    pub transition: u8,
    pub early_phase_1: u8,
    pub confirmed_phase_1: u8,
    pub late_phase_1: u8,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            transition: 30,
            early_phase_1: 50,
            confirmed_phase_1: 70,
            late_phase_1: 85,
        }
    }
}

/// Score-to-regime step function.
#[derive(Debug, Clone, Default)]
pub struct RegimeClassifier {
    thresholds: RegimeThresholds,
}

impl RegimeClassifier {
    /// Create a new classifier.
    pub fn new(thresholds: RegimeThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify a score. Each band is closed below and open above.
    pub fn classify(&self, score: u8) -> RegimeState {
        let t = &self.thresholds;
        if score < t.transition {
            RegimeState::Panic
        } else if score < t.early_phase_1 {
            RegimeState::Transition
        } else if score < t.confirmed_phase_1 {
            RegimeState::EarlyPhase1
        } else if score < t.late_phase_1 {
            RegimeState::ConfirmedPhase1
        } else {
            RegimeState::LatePhase1
        }
    }
}
