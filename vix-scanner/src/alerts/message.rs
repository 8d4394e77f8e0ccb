//! Alert payloads and their text rendering.

use std::fmt::Write;

use crate::data::{Changes, MarketSnapshot};
use crate::history::{Metric, MetricStrengths, PerMetric, WeeklySummary};
use crate::regime::RegimeState;

use super::guidance::OptionGuidance;

/// Sent once when the scan loop starts.
pub const STARTUP_MESSAGE: &str = "✅ VIX Scanner started: regime alerts, weekly dashboard and live option guidance";

/// Width of a strength bar in blocks.
const BAR_WIDTH: usize = 10;

/// Everything reported on a phase alert.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub snapshot: MarketSnapshot,
    pub changes: Changes,
    pub score: u8,
    pub regime: RegimeState,
    pub strengths: MetricStrengths,
    pub smoothed: MetricStrengths,
    pub guidance: OptionGuidance,
    /// Trend window contents after this tick, oldest first.
    pub trends: PerMetric<Vec<u8>>,
    pub trend_length: usize,
}

/// A notification produced by a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    FakeSpike,
    EarlyWarning { spread: f64 },
    Phase(Box<PhaseReport>),
    Dashboard {
        summary: WeeklySummary,
        regime: RegimeState,
    },
}

impl Alert {
    /// Message text for the notifier.
    pub fn render(&self) -> String {
        match self {
            Self::FakeSpike => "⚠️ FAKE SPIKE DETECTED: avoid VIX puts".to_string(),
            Self::EarlyWarning { spread } => format!(
                "👀 PRE-PHASE-1 ALERT: spread approaching negative ({:.3})",
                spread
            ),
            Self::Phase(report) => render_phase(report),
            Self::Dashboard { summary, regime } => render_dashboard(summary, *regime),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FakeSpike => "fake_spike",
            Self::EarlyWarning { .. } => "early_warning",
            Self::Phase(_) => "phase",
            Self::Dashboard { .. } => "dashboard",
        }
    }
}

/// Text for a tick that failed.
pub fn error_message(error: &dyn std::error::Error) -> String {
    format!("Scanner error: {}", error)
}

/// Traffic-light symbol for a strength.
pub fn heatmap_symbol(strength: u8) -> &'static str {
    if strength > 70 {
        "✅"
    } else if strength > 40 {
        "⚠️"
    } else {
        "❌"
    }
}

/// Ten-block bar, one filled block per 10 points.
pub fn bar_visual(strength: u8) -> String {
    let filled = (strength as usize / 10).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "─".repeat(BAR_WIDTH - filled))
}

/// One bar per stored reading, oldest first.
pub fn trend_visual(readings: &[u8]) -> String {
    readings.iter().map(|&v| bar_visual(v) + "\n").collect()
}

fn render_phase(r: &PhaseReport) -> String {
    let cell = |m: Metric| {
        let now = *r.strengths.get(m);
        let smooth = *r.smoothed.get(m);
        format!(
            "{} ({}) / {} ({})",
            heatmap_symbol(now),
            now,
            heatmap_symbol(smooth),
            smooth
        )
    };

    let mut out = String::from("📊 VOL STRENGTH HEATMAP\n\n");
    let _ = writeln!(out, "VIX: {:.2} {}", r.snapshot.vix, cell(Metric::Vix));
    let _ = writeln!(out, "VVIX: {:.2} {}", r.snapshot.vvix, cell(Metric::Vvix));
    let _ = writeln!(out, "VX1-VX2 Spread: {:.3} {}", r.changes.spread, cell(Metric::Spread));
    let _ = writeln!(out, "SPX Change: {:.2}% {}", r.changes.spx_change, cell(Metric::Spx));
    let _ = writeln!(out);
    let _ = writeln!(out, "Regime: {} ({})", r.regime, r.regime.description());
    let _ = writeln!(out, "Probability VIX<18 (10d): {}%", r.score);
    let _ = writeln!(out);
    let _ = writeln!(out, "Action Guidance:\n{}", r.guidance);
    let _ = writeln!(out);
    let _ = writeln!(out, "📈 Recent Trends (last {} readings)", r.trend_length);
    for metric in Metric::ALL {
        let _ = write!(out, "{}:\n{}", metric.label(), trend_visual(r.trends.get(metric)));
    }
    out.trim_end().to_string()
}

fn render_dashboard(summary: &WeeklySummary, regime: RegimeState) -> String {
    let mut out = format!(
        "📅 Weekly VIX Dashboard (last {} readings)\n\n",
        summary.records.len()
    );
    for record in &summary.records {
        let s = &record.strengths;
        let _ = writeln!(
            out,
            "{} | VIX: {} | VVIX: {} | Spread: {} | SPX: {} | Regime: {}",
            record.date,
            bar_visual(s.vix),
            bar_visual(s.vvix),
            bar_visual(s.spread),
            bar_visual(s.spx),
            record.regime
        );
    }

    let avg = |m: Metric| summary.averages.get(m).trunc() as i64;
    let arrow = |m: Metric| summary.arrows.get(m).symbol();
    let _ = writeln!(
        out,
        "\nAverage Strength: VIX {}, VVIX {}, Spread {}, SPX {}",
        avg(Metric::Vix),
        avg(Metric::Vvix),
        avg(Metric::Spread),
        avg(Metric::Spx)
    );
    let _ = writeln!(
        out,
        "Trend Arrows: VIX {}, VVIX {}, Spread {}, SPX {}",
        arrow(Metric::Vix),
        arrow(Metric::Vvix),
        arrow(Metric::Spread),
        arrow(Metric::Spx)
    );
    let _ = write!(out, "Current Regime: {}", regime);
    out
}
