//! Alert gating.
//!
//! Phase alerts are edge-triggered on regime changes into an alertable
//! regime. Early warnings are level-triggered on the spread band.

use crate::regime::RegimeState;

/// Spread at or below this is already deep negative and scored instead.
pub const EARLY_WARNING_FLOOR: f64 = -0.5;

/// Default upper bound of the early-warning band.
pub const DEFAULT_EARLY_WARNING_THRESHOLD: f64 = -0.25;

/// Which alerts fire this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertDecision {
    pub phase: bool,
    pub early_warning: bool,
}

/// Decides which alerts a scored tick warrants.
#[derive(Debug, Clone)]
pub struct AlertGate {
    early_warning_threshold: f64,
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new(DEFAULT_EARLY_WARNING_THRESHOLD)
    }
}

impl AlertGate {
    pub fn new(early_warning_threshold: f64) -> Self {
        Self {
            early_warning_threshold,
        }
    }

    /// Regime changed, and into one worth announcing.
    pub fn should_alert_phase(&self, new: RegimeState, previous: Option<RegimeState>) -> bool {
        previous != Some(new) && new.is_alertable()
    }

    /// Spread inside `(-0.5, threshold]`.
    pub fn should_warn_early(&self, spread: f64) -> bool {
        spread <= self.early_warning_threshold && spread > EARLY_WARNING_FLOOR
    }

    pub fn evaluate(
        &self,
        new: RegimeState,
        previous: Option<RegimeState>,
        spread: f64,
    ) -> AlertDecision {
        AlertDecision {
            phase: self.should_alert_phase(new, previous),
            early_warning: self.should_warn_early(spread),
        }
    }
}
