//! Notification delivery.
//!
//! Delivery is best-effort: a failed send is logged and never aborts a tick.

pub mod telegram;

pub use telegram::TelegramNotifier;

use thiserror::Error;
use tracing::{info, warn};

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Text message sink.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&mut self, text: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&mut self, text: &str) -> Result<(), NotifyError> {
        info!(target: "vix_scanner::notify", "\n{}", text);
        Ok(())
    }
}

/// Send and swallow any failure. Returns whether delivery succeeded.
pub async fn notify_best_effort<N: Notifier>(notifier: &mut N, text: &str) -> bool {
    match notifier.send(text).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "notification failed");
            false
        }
    }
}
