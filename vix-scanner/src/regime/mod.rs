//! Market regime classification module.
//!
//! Categorizes the mean-reversion probability score into phases:
//! - Panic: score < 30
//! - Transition: 30-49
//! - Early Phase 1: 50-69
//! - Confirmed Phase 1: 70-84
//! - Late Phase 1: 85+

pub mod classifier;

pub use classifier::{RegimeClassifier, RegimeState, RegimeThresholds};
