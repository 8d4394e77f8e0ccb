pub mod alerts;
pub mod data;
pub mod history;
pub mod notify;
pub mod regime;
pub mod scanner;
pub mod signals;

// Re-export commonly used types
pub use alerts::{option_guidance, Alert, AlertGate, OptionGuidance};
pub use data::{Changes, MarketSnapshot, SnapshotSource, YahooSource};
pub use history::{BoundedBuffer, HistoryBuffers, HistoryStore, JsonHistoryStore};
pub use notify::{LogNotifier, Notifier, TelegramNotifier};
pub use regime::{RegimeClassifier, RegimeState};
pub use scanner::{Scanner, ScannerConfig, ScannerState, TickOutcome};
pub use signals::{compute_changes, probability_score};
