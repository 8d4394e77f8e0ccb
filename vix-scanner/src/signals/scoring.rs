//! Mean-reversion probability score.
//!
//! Fixed-weight checklist: each condition contributes its full weight or
//! nothing, and the weights sum to 100.

use serde::Serialize;

use crate::data::{Changes, MarketSnapshot};

/// Maximum attainable score.
pub const MAX_SCORE: u8 = 100;

/// One scored condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScoringCondition {
    /// `|vix_change| > 3`.
    VixMove,
    /// `vx1 < vx2`.
    Contango,
    /// `spread < -0.5`.
    DeepNegativeSpread,
    /// Spread below the previous tick's.
    SpreadTrendingDown,
    /// `vvix_change < 0`.
    VvixFalling,
    /// SPX up while VIX down.
    RiskOn,
    /// `vx1 < vx2 < vx3`.
    FullContango,
}

impl ScoringCondition {
    /// All conditions, in checklist order.
    pub const ALL: [ScoringCondition; 7] = [
        Self::VixMove,
        Self::Contango,
        Self::DeepNegativeSpread,
        Self::SpreadTrendingDown,
        Self::VvixFalling,
        Self::RiskOn,
        Self::FullContango,
    ];

    /// Points contributed when the condition holds.
    pub fn weight(&self) -> u8 {
        match self {
            Self::VixMove => 20,
            Self::Contango => 20,
            Self::DeepNegativeSpread => 15,
            Self::SpreadTrendingDown => 10,
            Self::VvixFalling => 15,
            Self::RiskOn => 10,
            Self::FullContango => 10,
        }
    }

    /// Whether the condition holds for this tick.
    pub fn holds(&self, snapshot: &MarketSnapshot, changes: &Changes) -> bool {
        match self {
            Self::VixMove => changes.vix_change.abs() > 3.0,
            Self::Contango => snapshot.is_contango(),
            Self::DeepNegativeSpread => changes.spread < -0.5,
            Self::SpreadTrendingDown => changes.spread_trending_down,
            Self::VvixFalling => changes.vvix_change < 0.0,
            Self::RiskOn => changes.spx_change > 0.0 && changes.vix_change < 0.0,
            Self::FullContango => snapshot.is_full_contango(),
        }
    }
}

/// Sum of weights for the conditions that hold.
pub fn score_conditions<I>(conditions: I) -> u8
where
    I: IntoIterator<Item = ScoringCondition>,
{
    conditions
        .into_iter()
        .map(|c| c.weight())
        .sum::<u8>()
        .min(MAX_SCORE)
}

/// Conditions that hold for this tick, in checklist order.
pub fn triggered_conditions(snapshot: &MarketSnapshot, changes: &Changes) -> Vec<ScoringCondition> {
    ScoringCondition::ALL
        .into_iter()
        .filter(|c| c.holds(snapshot, changes))
        .collect()
}

/// Probability score in `[0, 100]`.
pub fn probability_score(snapshot: &MarketSnapshot, changes: &Changes) -> u8 {
    score_conditions(triggered_conditions(snapshot, changes))
}
