//! Weekly aggregation of alert-time strengths.
//!
//! A record is kept for every phase alert, up to the window size. The
//! dashboard is emitted at most once per interval and summarises whatever
//! the window holds.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::regime::RegimeState;

use super::ring::BoundedBuffer;
use super::strength::{Metric, MetricStrengths, PerMetric};

/// Minimum records needed before a dashboard is produced.
pub const MIN_DASHBOARD_RECORDS: usize = 2;

/// Strengths and regime captured on one alert tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    /// Month-day label (`%m-%d`).
    pub date: String,
    pub strengths: MetricStrengths,
    pub regime: RegimeState,
}

/// Direction of a metric across the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendArrow {
    Up,
    Down,
    Flat,
}

impl TrendArrow {
    /// Compare the newest reading against the oldest.
    pub fn between(first: u8, last: u8) -> Self {
        if last > first {
            Self::Up
        } else if last < first {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Flat => "→",
        }
    }
}

/// Per-metric summary of the weekly window.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub records: Vec<WeeklyRecord>,
    /// Arithmetic mean of stored strengths.
    pub averages: PerMetric<f64>,
    pub arrows: PerMetric<TrendArrow>,
}

/// Rolling window of alert-time records.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAggregator {
    records: BoundedBuffer<WeeklyRecord>,
}

impl WeeklyAggregator {
    pub fn new(length: usize) -> Self {
        Self {
            records: BoundedBuffer::new(length),
        }
    }

    pub fn from_records(records: BoundedBuffer<WeeklyRecord>) -> Self {
        Self { records }
    }

    /// Append a record stamped with `now`'s month-day.
    pub fn record(&mut self, now: DateTime<Utc>, strengths: MetricStrengths, regime: RegimeState) {
        self.records.push(WeeklyRecord {
            date: now.format("%m-%d").to_string(),
            strengths,
            regime,
        });
    }

    pub fn records(&self) -> &BoundedBuffer<WeeklyRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Averages and trend arrows, `None` with fewer than two records.
    pub fn summary(&self) -> Option<WeeklySummary> {
        if self.records.len() < MIN_DASHBOARD_RECORDS {
            return None;
        }
        let first = self.records.first()?;
        let last = self.records.last()?;
        let count = self.records.len() as f64;

        let averages = PerMetric::from_fn(|m: Metric| {
            let sum: f64 = self
                .records
                .iter()
                .map(|r| *r.strengths.get(m) as f64)
                .sum();
            sum / count
        });
        let arrows = PerMetric::from_fn(|m: Metric| {
            TrendArrow::between(*first.strengths.get(m), *last.strengths.get(m))
        });

        Some(WeeklySummary {
            records: self.records.to_vec(),
            averages,
            arrows,
        })
    }
}

/// Wall-clock gate for the dashboard.
///
/// Due once more than `interval` has passed since it last fired. Starts
/// already due.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSchedule {
    last_sent: DateTime<Utc>,
    interval: Duration,
}

impl DashboardSchedule {
    pub fn new(now: DateTime<Utc>, interval: Duration) -> Self {
        Self {
            last_sent: now - interval,
            interval,
        }
    }

    /// Returns true and re-arms when the interval has elapsed.
    pub fn check(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_sent > self.interval {
            self.last_sent = now;
            true
        } else {
            false
        }
    }
}
