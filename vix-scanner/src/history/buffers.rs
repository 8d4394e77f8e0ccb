//! All rolling buffers the scanner keeps across restarts.
//!
//! In memory the buffers are typed per concern; on disk they are a flat
//! map of buffer name to list, one list per metric and weekly field.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::regime::RegimeState;

use super::ring::BoundedBuffer;
use super::strength::{Metric, PerMetric, SmoothingTracker, TrendHistory};
use super::weekly::{WeeklyAggregator, WeeklyRecord};

/// Declared capacity of each buffer family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCapacities {
    pub smoothing: usize,
    pub trend: usize,
    pub weekly: usize,
}

impl Default for BufferCapacities {
    fn default() -> Self {
        Self {
            smoothing: 3,
            trend: 5,
            weekly: 7,
        }
    }
}

/// On-disk layout: buffer name to its elements, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedHistory {
    pub vix_strength: Vec<u8>,
    pub vvix_strength: Vec<u8>,
    pub spread_strength: Vec<u8>,
    pub spx_strength: Vec<u8>,
    pub vix_trend: Vec<u8>,
    pub vvix_trend: Vec<u8>,
    pub spread_trend: Vec<u8>,
    pub spx_trend: Vec<u8>,
    pub vix_week: Vec<u8>,
    pub vvix_week: Vec<u8>,
    pub spread_week: Vec<u8>,
    pub spx_week: Vec<u8>,
    pub regime_week: Vec<String>,
    pub date_week: Vec<String>,
}

impl PersistedHistory {
    fn strength_lists(&self) -> PerMetric<&Vec<u8>> {
        PerMetric {
            vix: &self.vix_strength,
            vvix: &self.vvix_strength,
            spread: &self.spread_strength,
            spx: &self.spx_strength,
        }
    }

    fn trend_lists(&self) -> PerMetric<&Vec<u8>> {
        PerMetric {
            vix: &self.vix_trend,
            vvix: &self.vvix_trend,
            spread: &self.spread_trend,
            spx: &self.spx_trend,
        }
    }

    fn week_lists(&self) -> PerMetric<&Vec<u8>> {
        PerMetric {
            vix: &self.vix_week,
            vvix: &self.vvix_week,
            spread: &self.spread_week,
            spx: &self.spx_week,
        }
    }
}

/// Rebuild one metric family, keeping the newest entries of each list.
fn load_windows(
    family: &str,
    lists: PerMetric<&Vec<u8>>,
    capacity: usize,
) -> PerMetric<BoundedBuffer<u8>> {
    lists.map(|metric, list| {
        let (buffer, dropped) = BoundedBuffer::from_newest(capacity, list.iter().copied());
        if dropped > 0 {
            warn!(
                family,
                metric = metric.label(),
                dropped,
                capacity,
                "stored buffer over capacity, kept newest entries"
            );
        }
        buffer
    })
}

/// Rebuild weekly records from the parallel lists, aligned on their newest entries.
fn load_weekly(stored: &PersistedHistory, capacity: usize) -> BoundedBuffer<WeeklyRecord> {
    let weeks = stored.week_lists();
    let lengths = [
        weeks.vix.len(),
        weeks.vvix.len(),
        weeks.spread.len(),
        weeks.spx.len(),
        stored.regime_week.len(),
        stored.date_week.len(),
    ];
    let aligned = lengths.iter().copied().min().unwrap_or(0);
    if lengths.iter().any(|&len| len != aligned) {
        warn!(?lengths, aligned, "weekly lists differ in length, aligning on newest entries");
    }

    let tail = |len: usize, i: usize| len - aligned + i;
    let mut records = Vec::with_capacity(aligned);
    for i in 0..aligned {
        let regime_raw = &stored.regime_week[tail(stored.regime_week.len(), i)];
        let regime: RegimeState = match regime_raw.parse() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping weekly record");
                continue;
            }
        };
        records.push(WeeklyRecord {
            date: stored.date_week[tail(stored.date_week.len(), i)].clone(),
            strengths: weeks.map(|_, list| list[tail(list.len(), i)]),
            regime,
        });
    }

    let (buffer, dropped) = BoundedBuffer::from_newest(capacity, records);
    if dropped > 0 {
        warn!(dropped, capacity, "stored weekly records over capacity, kept newest entries");
    }
    buffer
}

/// Smoothing, trend and weekly buffers as one state record.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffers {
    pub smoothing: SmoothingTracker,
    pub trend: TrendHistory,
    pub weekly: WeeklyAggregator,
}

impl HistoryBuffers {
    /// Empty buffers with the given capacities.
    pub fn new(capacities: BufferCapacities) -> Self {
        Self {
            smoothing: SmoothingTracker::new(capacities.smoothing),
            trend: TrendHistory::new(capacities.trend),
            weekly: WeeklyAggregator::new(capacities.weekly),
        }
    }

    /// Restore from disk. Lists over capacity keep their newest entries.
    pub fn from_persisted(stored: &PersistedHistory, capacities: BufferCapacities) -> Self {
        Self {
            smoothing: SmoothingTracker::from_windows(load_windows(
                "smoothing",
                stored.strength_lists(),
                capacities.smoothing,
            )),
            trend: TrendHistory::from_windows(load_windows(
                "trend",
                stored.trend_lists(),
                capacities.trend,
            )),
            weekly: WeeklyAggregator::from_records(load_weekly(stored, capacities.weekly)),
        }
    }

    /// Flatten into the on-disk layout.
    pub fn to_persisted(&self) -> PersistedHistory {
        let smoothing = |m: Metric| self.smoothing.window(m).to_vec();
        let trend = |m: Metric| self.trend.window(m).to_vec();
        let records = self.weekly.records();
        let week = |m: Metric| -> Vec<u8> { records.iter().map(|r| *r.strengths.get(m)).collect() };

        PersistedHistory {
            vix_strength: smoothing(Metric::Vix),
            vvix_strength: smoothing(Metric::Vvix),
            spread_strength: smoothing(Metric::Spread),
            spx_strength: smoothing(Metric::Spx),
            vix_trend: trend(Metric::Vix),
            vvix_trend: trend(Metric::Vvix),
            spread_trend: trend(Metric::Spread),
            spx_trend: trend(Metric::Spx),
            vix_week: week(Metric::Vix),
            vvix_week: week(Metric::Vvix),
            spread_week: week(Metric::Spread),
            spx_week: week(Metric::Spx),
            regime_week: records.iter().map(|r| r.regime.to_string()).collect(),
            date_week: records.iter().map(|r| r.date.clone()).collect(),
        }
    }
}
