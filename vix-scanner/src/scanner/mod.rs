//! Scanner wiring: configuration, per-tick engine and the run loop.

pub mod config;
pub mod engine;
pub mod runner;

pub use config::{ConfigError, ScannerConfig};
pub use engine::{ScannerState, ScoredTick, TickOutcome};
pub use runner::{restore_history, Scanner, TickError};
