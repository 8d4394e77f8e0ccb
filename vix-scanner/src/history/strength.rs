//! Signal strength scores and their rolling windows.
//!
//! A strength is a 0-100 reading of how bullish (for mean-reversion) a
//! metric's latest move is. 50 is neutral; every unit of change moves it 5.

use serde::{Deserialize, Serialize};

use crate::data::Changes;

use super::ring::BoundedBuffer;

/// The four tracked metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Vix,
    Vvix,
    Spread,
    Spx,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Self::Vix, Self::Vvix, Self::Spread, Self::Spx];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vix => "VIX",
            Self::Vvix => "VVIX",
            Self::Spread => "Spread",
            Self::Spx => "SPX",
        }
    }

    /// Whether a decrease in the raw value is the bullish direction.
    pub fn falling_is_bullish(&self) -> bool {
        !matches!(self, Self::Spx)
    }

    /// Raw directional input for this metric.
    pub fn raw_value(&self, changes: &Changes) -> f64 {
        match self {
            Self::Vix => changes.vix_change,
            Self::Vvix => changes.vvix_change,
            Self::Spread => changes.spread,
            Self::Spx => changes.spx_change,
        }
    }

    /// Instantaneous strength for this tick.
    pub fn strength(&self, changes: &Changes) -> u8 {
        let raw = self.raw_value(changes);
        let adjusted = if self.falling_is_bullish() { -raw } else { raw };
        signal_strength(adjusted)
    }
}

/// Linear map `value * 5 + 50`, rounded and clamped to `[0, 100]`.
pub fn signal_strength(value: f64) -> u8 {
    if value.is_nan() {
        return 50;
    }
    (value * 5.0 + 50.0).round().clamp(0.0, 100.0) as u8
}

/// One value per tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerMetric<T> {
    pub vix: T,
    pub vvix: T,
    pub spread: T,
    pub spx: T,
}

impl<T> PerMetric<T> {
    /// Build from a function of the metric.
    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self {
            vix: f(Metric::Vix),
            vvix: f(Metric::Vvix),
            spread: f(Metric::Spread),
            spx: f(Metric::Spx),
        }
    }

    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::Vix => &self.vix,
            Metric::Vvix => &self.vvix,
            Metric::Spread => &self.spread,
            Metric::Spx => &self.spx,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::Vix => &mut self.vix,
            Metric::Vvix => &mut self.vvix,
            Metric::Spread => &mut self.spread,
            Metric::Spx => &mut self.spx,
        }
    }

    /// Apply `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(Metric, &T) -> U) -> PerMetric<U> {
        PerMetric::from_fn(|m| f(m, self.get(m)))
    }
}

/// Instantaneous strengths for one tick.
pub type MetricStrengths = PerMetric<u8>;

impl MetricStrengths {
    /// Strengths for every metric from this tick's changes.
    pub fn from_changes(changes: &Changes) -> Self {
        PerMetric::from_fn(|m| m.strength(changes))
    }
}

/// Integer mean of a strength window, `None` when empty.
pub fn mean_strength(buffer: &BoundedBuffer<u8>) -> Option<u8> {
    if buffer.is_empty() {
        return None;
    }
    let sum: u32 = buffer.iter().map(|&v| v as u32).sum();
    Some((sum / buffer.len() as u32) as u8)
}

/// Short rolling average of strengths, per metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingTracker {
    windows: PerMetric<BoundedBuffer<u8>>,
}

impl SmoothingTracker {
    pub fn new(window: usize) -> Self {
        Self {
            windows: PerMetric::from_fn(|_| BoundedBuffer::new(window)),
        }
    }

    pub fn from_windows(windows: PerMetric<BoundedBuffer<u8>>) -> Self {
        Self { windows }
    }

    /// Append this tick's strengths and return the smoothed values.
    pub fn record(&mut self, strengths: &MetricStrengths) -> MetricStrengths {
        for metric in Metric::ALL {
            self.windows.get_mut(metric).push(*strengths.get(metric));
        }
        self.smoothed()
    }

    /// Integer mean of each window (0 for an empty window).
    pub fn smoothed(&self) -> MetricStrengths {
        self.windows.map(|_, w| mean_strength(w).unwrap_or(0))
    }

    pub fn window(&self, metric: Metric) -> &BoundedBuffer<u8> {
        self.windows.get(metric)
    }
}

/// Recent strengths kept for the trend charts.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendHistory {
    windows: PerMetric<BoundedBuffer<u8>>,
}

impl TrendHistory {
    pub fn new(length: usize) -> Self {
        Self {
            windows: PerMetric::from_fn(|_| BoundedBuffer::new(length)),
        }
    }

    pub fn from_windows(windows: PerMetric<BoundedBuffer<u8>>) -> Self {
        Self { windows }
    }

    pub fn record(&mut self, strengths: &MetricStrengths) {
        for metric in Metric::ALL {
            self.windows.get_mut(metric).push(*strengths.get(metric));
        }
    }

    pub fn window(&self, metric: Metric) -> &BoundedBuffer<u8> {
        self.windows.get(metric)
    }

    /// Stored readings for a metric, oldest first.
    pub fn readings(&self, metric: Metric) -> Vec<u8> {
        self.windows.get(metric).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_strength_map() {
        assert_eq!(signal_strength(0.0), 50);
        assert_eq!(signal_strength(2.0), 60);
        assert_eq!(signal_strength(-4.0), 30);
        assert_eq!(signal_strength(10.0), 100);
        assert_eq!(signal_strength(25.0), 100);
        assert_eq!(signal_strength(-12.0), 0);
        // rounds half away from zero
        assert_eq!(signal_strength(1.1), 56);
        assert_eq!(signal_strength(1.3), 57);
        assert_eq!(signal_strength(f64::NAN), 50);
    }

    #[test]
    fn test_metric_polarity() {
        let changes = Changes {
            vix_change: -4.0,
            vvix_change: 2.0,
            spx_change: 1.0,
            spread: -0.6,
            spread_trending_down: true,
        };
        let strengths = MetricStrengths::from_changes(&changes);
        assert_eq!(strengths.vix, 70);
        assert_eq!(strengths.vvix, 40);
        assert_eq!(strengths.spread, 53);
        assert_eq!(strengths.spx, 55);
    }

    #[test]
    fn test_smoothing_is_integer_mean() {
        let mut tracker = SmoothingTracker::new(3);
        let s = |v: u8| PerMetric { vix: v, vvix: v, spread: v, spx: v };

        assert_eq!(tracker.record(&s(60)).vix, 60);
        assert_eq!(tracker.record(&s(61)).vix, 60);
        assert_eq!(tracker.record(&s(70)).vix, 63);
        // 60 evicted: (61 + 70 + 100) / 3 = 77
        assert_eq!(tracker.record(&s(100)).vix, 77);
        assert_eq!(tracker.window(Metric::Vix).len(), 3);
    }

    #[test]
    fn test_empty_smoothing() {
        let tracker = SmoothingTracker::new(3);
        assert_eq!(tracker.smoothed(), PerMetric::default());
    }

    #[test]
    fn test_trend_history_bounded() {
        let mut trend = TrendHistory::new(5);
        for v in 0..8u8 {
            trend.record(&PerMetric { vix: v, vvix: v, spread: v, spx: v * 10 });
        }
        assert_eq!(trend.readings(Metric::Vix), vec![3, 4, 5, 6, 7]);
        assert_eq!(trend.readings(Metric::Spx), vec![30, 40, 50, 60, 70]);
    }
}
