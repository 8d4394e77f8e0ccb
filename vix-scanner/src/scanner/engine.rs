//! Per-tick evaluation.
//!
//! `ScannerState::evaluate` is the whole decision path for one snapshot:
//! changes, fake-spike short circuit, score, regime, alert gating, buffer
//! updates and the dashboard gate. The previous-tick state is committed
//! last, after every decision has read it.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::alerts::{option_guidance, Alert, AlertGate, PhaseReport};
use crate::data::{Changes, MarketSnapshot};
use crate::history::{DashboardSchedule, HistoryBuffers, MetricStrengths, PerMetric};
use crate::regime::{RegimeClassifier, RegimeState};
use crate::signals::{compute_changes, is_fake_spike, probability_score, ComputeError, PreviousState};

use super::config::ScannerConfig;

/// A scored (non-spike) tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTick {
    pub changes: Changes,
    pub score: u8,
    pub regime: RegimeState,
    pub previous_regime: Option<RegimeState>,
    /// Notifications in send order.
    pub alerts: Vec<Alert>,
    /// Rolling buffers were appended and should be persisted.
    pub history_changed: bool,
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fake spike: nothing scored, nothing committed.
    FakeSpike { changes: Changes },
    Scored(ScoredTick),
}

impl TickOutcome {
    /// Notifications this tick produced, in send order.
    pub fn alerts(&self) -> Vec<Alert> {
        match self {
            Self::FakeSpike { .. } => vec![Alert::FakeSpike],
            Self::Scored(tick) => tick.alerts.clone(),
        }
    }

    pub fn history_changed(&self) -> bool {
        matches!(self, Self::Scored(tick) if tick.history_changed)
    }
}

/// Cross-tick memory of the scanner.
#[derive(Debug, Clone)]
pub struct ScannerState {
    previous: PreviousState,
    history: HistoryBuffers,
    schedule: DashboardSchedule,
    classifier: RegimeClassifier,
    gate: AlertGate,
    trend_length: usize,
}

impl ScannerState {
    /// Fresh state around already-restored history.
    pub fn new(config: &ScannerConfig, history: HistoryBuffers, now: DateTime<Utc>) -> Self {
        Self {
            previous: PreviousState::default(),
            history,
            schedule: DashboardSchedule::new(now, config.dashboard_interval()),
            classifier: RegimeClassifier::new(config.regime_thresholds),
            gate: AlertGate::new(config.early_warning_threshold),
            trend_length: config.trend_window,
        }
    }

    pub fn previous(&self) -> &PreviousState {
        &self.previous
    }

    pub fn history(&self) -> &HistoryBuffers {
        &self.history
    }

    /// Evaluate one snapshot taken at `now`.
    pub fn evaluate(
        &mut self,
        snapshot: &MarketSnapshot,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, ComputeError> {
        let changes = compute_changes(snapshot, &self.previous)?;

        if is_fake_spike(snapshot, &changes) {
            info!(
                vix_change = changes.vix_change,
                vvix_change = changes.vvix_change,
                "fake spike detected, skipping tick"
            );
            return Ok(TickOutcome::FakeSpike { changes });
        }

        let score = probability_score(snapshot, &changes);
        let regime = self.classifier.classify(score);
        let previous_regime = self.previous.regime;
        let decision = self.gate.evaluate(regime, previous_regime, changes.spread);
        debug!(score, %regime, ?previous_regime, ?decision, "tick scored");

        let mut alerts = Vec::new();
        if decision.early_warning {
            alerts.push(Alert::EarlyWarning {
                spread: changes.spread,
            });
        }

        if decision.phase {
            let report = self.record_phase(snapshot, &changes, score, regime, now);
            alerts.push(Alert::Phase(Box::new(report)));
            info!(%regime, score, "phase alert");
        }

        if self.schedule.check(now) {
            match self.history.weekly.summary() {
                Some(summary) => alerts.push(Alert::Dashboard { summary, regime }),
                None => debug!(records = self.history.weekly.len(), "dashboard due, not enough records"),
            }
        }

        self.previous.commit(snapshot, changes.spread, regime);

        Ok(TickOutcome::Scored(ScoredTick {
            changes,
            score,
            regime,
            previous_regime,
            alerts,
            history_changed: decision.phase,
        }))
    }

    /// Append this tick's strengths to every buffer and build the report.
    fn record_phase(
        &mut self,
        snapshot: &MarketSnapshot,
        changes: &Changes,
        score: u8,
        regime: RegimeState,
        now: DateTime<Utc>,
    ) -> PhaseReport {
        let strengths = MetricStrengths::from_changes(changes);
        let smoothed = self.history.smoothing.record(&strengths);
        self.history.trend.record(&strengths);
        self.history.weekly.record(now, strengths, regime);

        let trend = &self.history.trend;
        PhaseReport {
            snapshot: *snapshot,
            changes: *changes,
            score,
            regime,
            strengths,
            smoothed,
            guidance: option_guidance(regime, snapshot.vix),
            trends: PerMetric::from_fn(|m| trend.readings(m)),
            trend_length: self.trend_length,
        }
    }
}
