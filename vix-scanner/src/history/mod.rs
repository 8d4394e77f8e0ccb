//! Rolling history kept across ticks and restarts.
//!
//! - Fixed-capacity buffers with oldest-first eviction
//! - Strength smoothing and trend windows
//! - Weekly alert records and the dashboard schedule
//! - JSON persistence

pub mod buffers;
pub mod ring;
pub mod store;
pub mod strength;
pub mod weekly;

pub use buffers::{BufferCapacities, HistoryBuffers, PersistedHistory};
pub use ring::BoundedBuffer;
pub use store::{HistoryStore, JsonHistoryStore, PersistenceError};
pub use strength::{signal_strength, Metric, MetricStrengths, PerMetric, SmoothingTracker, TrendHistory};
pub use weekly::{DashboardSchedule, TrendArrow, WeeklyAggregator, WeeklyRecord, WeeklySummary};
