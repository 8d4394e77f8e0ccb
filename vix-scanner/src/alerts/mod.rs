//! Alerting: which notifications a tick warrants and what they say.

pub mod gate;
pub mod guidance;
pub mod message;

pub use gate::{AlertDecision, AlertGate, DEFAULT_EARLY_WARNING_THRESHOLD, EARLY_WARNING_FLOOR};
pub use guidance::{option_guidance, OptionGuidance};
pub use message::{bar_visual, error_message, heatmap_symbol, trend_visual, Alert, PhaseReport, STARTUP_MESSAGE};
