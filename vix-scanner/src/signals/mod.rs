//! Per-tick signal derivation.
//!
//! - Percent changes against the previous tick
//! - Fake-spike detection (short-circuits the tick)
//! - Fixed-weight probability score

pub mod changes;
pub mod scoring;

pub use changes::{compute_changes, is_fake_spike, ComputeError, PreviousState};
pub use scoring::{probability_score, score_conditions, triggered_conditions, ScoringCondition, MAX_SCORE};
