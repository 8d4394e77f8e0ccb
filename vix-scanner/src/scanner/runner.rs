//! The scan loop.
//!
//! One task, one tick at a time: fetch, evaluate, persist, notify, sleep.
//! A failed tick is reported and retried on the next poll.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::alerts::{error_message, STARTUP_MESSAGE};
use crate::data::{FetchError, SnapshotSource};
use crate::history::{HistoryBuffers, HistoryStore};
use crate::notify::{notify_best_effort, Notifier};
use crate::signals::ComputeError;

use super::config::ScannerConfig;
use super::engine::{ScannerState, TickOutcome};

/// Errors that abort a single tick.
#[derive(Error, Debug)]
pub enum TickError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("compute failed: {0}")]
    Compute(#[from] ComputeError),
}

/// Restore buffers from the store, falling back to empty ones.
pub fn restore_history<H: HistoryStore>(store: &H, config: &ScannerConfig) -> HistoryBuffers {
    match store.load() {
        Ok(Some(stored)) => HistoryBuffers::from_persisted(&stored, config.capacities()),
        Ok(None) => HistoryBuffers::new(config.capacities()),
        Err(e) => {
            warn!(error = %e, "could not load history, starting with empty buffers");
            HistoryBuffers::new(config.capacities())
        }
    }
}

/// Scanner wired to its collaborators.
pub struct Scanner<S, N, H> {
    config: ScannerConfig,
    source: S,
    notifier: N,
    store: H,
    state: ScannerState,
    persist: bool,
}

impl<S, N, H> Scanner<S, N, H>
where
    S: SnapshotSource,
    N: Notifier,
    H: HistoryStore,
{
    /// Build a scanner, restoring history from `store`.
    pub fn new(config: ScannerConfig, source: S, notifier: N, store: H, now: DateTime<Utc>) -> Self {
        let history = restore_history(&store, &config);
        let state = ScannerState::new(&config, history, now);
        Self {
            config,
            source,
            notifier,
            store,
            state,
            persist: true,
        }
    }

    /// Read history from the store but never write it back.
    ///
    /// Each fresh scanner starts without a previous tick, so ticks from
    /// separate processes must not feed the shared buffers.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    /// Fetch, evaluate, persist and notify for one tick.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome, TickError> {
        let snapshot = self.source.fetch().await?;
        let outcome = self.state.evaluate(&snapshot, now)?;

        if self.persist && outcome.history_changed() {
            if let Err(e) = self.store.save(&self.state.history().to_persisted()) {
                error!(error = %e, "failed to save history");
            }
        }

        for alert in outcome.alerts() {
            notify_best_effort(&mut self.notifier, &alert.render()).await;
        }

        Ok(outcome)
    }

    /// Run one tick and report any failure. Returns whether the tick succeeded.
    pub async fn step(&mut self, now: DateTime<Utc>) -> bool {
        match self.tick(now).await {
            Ok(TickOutcome::Scored(tick)) => {
                info!(
                    score = tick.score,
                    regime = %tick.regime,
                    alerts = tick.alerts.len(),
                    "tick complete"
                );
                true
            }
            Ok(TickOutcome::FakeSpike { .. }) => true,
            Err(e) => {
                error!(error = %e, "tick failed");
                notify_best_effort(&mut self.notifier, &error_message(&e)).await;
                false
            }
        }
    }

    /// Announce startup, then tick forever at the poll interval.
    pub async fn run(&mut self) {
        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            history_file = %self.config.history_file.display(),
            "scanner started"
        );
        notify_best_effort(&mut self.notifier, STARTUP_MESSAGE).await;

        loop {
            self.step(Utc::now()).await;
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::{Duration, TimeZone};

    use crate::data::MarketSnapshot;
    use crate::history::{Metric, PersistedHistory, PersistenceError};
    use crate::notify::NotifyError;
    use crate::regime::RegimeState;

    struct ScriptedSource {
        snapshots: VecDeque<Result<MarketSnapshot, FetchError>>,
    }

    impl ScriptedSource {
        fn new(items: Vec<Result<MarketSnapshot, FetchError>>) -> Self {
            Self {
                snapshots: items.into(),
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        async fn fetch(&mut self) -> Result<MarketSnapshot, FetchError> {
            self.snapshots.pop_front().unwrap_or_else(|| {
                Err(FetchError::InvalidResponse {
                    symbol: "^VIX".to_string(),
                    reason: "script exhausted".to_string(),
                })
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Vec<String>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        async fn send(&mut self, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Rejected("chat not found".to_string()));
            }
            self.sent.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        stored: RefCell<Option<PersistedHistory>>,
        saves: RefCell<usize>,
        fail_load: bool,
        fail_save: bool,
    }

    impl HistoryStore for MemoryStore {
        fn load(&self) -> Result<Option<PersistedHistory>, PersistenceError> {
            if self.fail_load {
                return Err(PersistenceError::Io {
                    path: "history.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            Ok(self.stored.borrow().clone())
        }

        fn save(&self, history: &PersistedHistory) -> Result<(), PersistenceError> {
            if self.fail_save {
                return Err(PersistenceError::Io {
                    path: "history.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
                });
            }
            *self.stored.borrow_mut() = Some(history.clone());
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 7, 15, 30, 0).unwrap()
    }

    fn transition() -> MarketSnapshot {
        MarketSnapshot {
            vix: 20.0,
            vvix: 90.0,
            spx: 5000.0,
            vx1: 10.8,
            vx2: 11.0,
            vx3: 11.11,
        }
    }

    #[tokio::test]
    async fn test_alert_tick_saves_and_notifies() {
        let source = ScriptedSource::new(vec![Ok(transition()), Ok(transition())]);
        let mut scanner = Scanner::new(
            ScannerConfig::default(),
            source,
            RecordingNotifier::default(),
            MemoryStore::default(),
            start(),
        );

        let outcome = scanner.tick(start()).await.unwrap();
        assert!(outcome.history_changed());
        assert_eq!(*scanner.store().saves.borrow(), 1);
        assert_eq!(scanner.notifier().sent.len(), 1);
        assert!(scanner.notifier().sent[0].contains("Regime: TRANSITION"));

        let stored = scanner.store().stored.borrow().clone().unwrap();
        assert_eq!(stored.regime_week, vec!["TRANSITION".to_string()]);
        assert_eq!(stored.date_week, vec!["10-07".to_string()]);

        // same regime again: nothing saved, nothing sent
        scanner.tick(start() + Duration::minutes(10)).await.unwrap();
        assert_eq!(*scanner.store().saves.borrow(), 1);
        assert_eq!(scanner.notifier().sent.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_and_loop_continues() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::ApiError {
                symbol: "^VVIX".to_string(),
                status: "503 Service Unavailable".to_string(),
            }),
            Ok(transition()),
        ]);
        let mut scanner = Scanner::new(
            ScannerConfig::default(),
            source,
            RecordingNotifier::default(),
            MemoryStore::default(),
            start(),
        );

        assert!(!scanner.step(start()).await);
        assert!(scanner.notifier().sent[0].starts_with("Scanner error: fetch failed"));
        assert_eq!(scanner.state().previous().regime, None);

        assert!(scanner.step(start() + Duration::minutes(10)).await);
        assert_eq!(scanner.state().previous().regime, Some(RegimeState::Transition));
    }

    #[tokio::test]
    async fn test_notify_failure_does_not_abort_tick() {
        let mut scanner = Scanner::new(
            ScannerConfig::default(),
            ScriptedSource::new(vec![Ok(transition())]),
            RecordingNotifier {
                fail: true,
                ..Default::default()
            },
            MemoryStore::default(),
            start(),
        );

        assert!(scanner.step(start()).await);
        assert_eq!(*scanner.store().saves.borrow(), 1);
        assert_eq!(scanner.state().previous().regime, Some(RegimeState::Transition));
    }

    #[tokio::test]
    async fn test_fake_spike_sends_warning_only() {
        let mut spike = transition();
        spike.vix = 23.0;
        spike.vvix = 95.0;
        spike.vx1 = 12.0;
        spike.vx2 = 11.5;
        spike.vx3 = 11.0;

        let mut scanner = Scanner::new(
            ScannerConfig::default(),
            ScriptedSource::new(vec![Ok(transition()), Ok(spike)]),
            RecordingNotifier::default(),
            MemoryStore::default(),
            start(),
        );
        scanner.tick(start()).await.unwrap();
        let outcome = scanner.tick(start() + Duration::minutes(10)).await.unwrap();

        assert!(matches!(outcome, TickOutcome::FakeSpike { .. }));
        assert_eq!(scanner.notifier().sent.len(), 2);
        assert!(scanner.notifier().sent[1].contains("FAKE SPIKE"));
        assert_eq!(*scanner.store().saves.borrow(), 1);
        assert_eq!(scanner.state().previous().vix, Some(20.0));
    }

    #[tokio::test]
    async fn test_save_failure_does_not_abort_tick() {
        let mut scanner = Scanner::new(
            ScannerConfig::default(),
            ScriptedSource::new(vec![Ok(transition())]),
            RecordingNotifier::default(),
            MemoryStore {
                fail_save: true,
                ..Default::default()
            },
            start(),
        );

        assert!(scanner.step(start()).await);
        assert_eq!(scanner.notifier().sent.len(), 1);
        assert!(scanner.notifier().sent[0].starts_with("📊 VOL STRENGTH HEATMAP"));
        assert!(scanner.store().stored.borrow().is_none());
        assert_eq!(scanner.state().previous().regime, Some(RegimeState::Transition));
        assert_eq!(scanner.state().history().weekly.len(), 1);
    }

    #[tokio::test]
    async fn test_one_shot_runs_leave_shared_history_untouched() {
        let mut store = MemoryStore::default();
        *store.stored.borrow_mut() = Some(PersistedHistory {
            vix_week: vec![40],
            vvix_week: vec![45],
            spread_week: vec![50],
            spx_week: vec![55],
            regime_week: vec!["TRANSITION".to_string()],
            date_week: vec!["10-04".to_string()],
            ..Default::default()
        });
        let saved = store.stored.borrow().clone();

        for run in 0..2 {
            let now = start() + Duration::minutes(10 * run);
            let mut scanner = Scanner::new(
                ScannerConfig::default(),
                ScriptedSource::new(vec![Ok(transition())]),
                RecordingNotifier::default(),
                store,
                now,
            )
            .without_persistence();

            assert_eq!(scanner.state().history().weekly.len(), 1);
            assert!(scanner.step(now).await);
            store = scanner.store;
        }

        assert_eq!(*store.saves.borrow(), 0);
        assert_eq!(*store.stored.borrow(), saved);
    }

    #[test]
    fn test_restore_history() {
        let store = MemoryStore::default();
        *store.stored.borrow_mut() = Some(PersistedHistory {
            vix_trend: vec![10, 20, 30, 40, 50, 60, 70],
            ..Default::default()
        });
        let history = restore_history(&store, &ScannerConfig::default());
        assert_eq!(history.trend.readings(Metric::Vix), vec![30, 40, 50, 60, 70]);

        let broken = MemoryStore {
            fail_load: true,
            ..Default::default()
        };
        let history = restore_history(&broken, &ScannerConfig::default());
        assert!(history.weekly.is_empty());
    }
}
