//! Scanner configuration.
//!
//! Every field has a default, so an empty or partial TOML file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::{DEFAULT_EARLY_WARNING_THRESHOLD, EARLY_WARNING_FLOOR};
use crate::data::SymbolConfig;
use crate::history::BufferCapacities;
use crate::regime::RegimeThresholds;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Seconds between ticks.
    pub poll_interval_secs: u64,
    /// Upper bound of the early-warning spread band.
    pub early_warning_threshold: f64,
    /// Smoothing window length (readings).
    pub smoothing_window: usize,
    /// Trend chart length (readings).
    pub trend_window: usize,
    /// Weekly dashboard window (readings, not days).
    pub weekly_window: usize,
    /// Minimum hours between dashboards.
    pub dashboard_interval_hours: i64,
    /// JSON file holding the rolling buffers.
    pub history_file: PathBuf,
    pub symbols: SymbolConfig,
    pub regime_thresholds: RegimeThresholds,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 600,
            early_warning_threshold: DEFAULT_EARLY_WARNING_THRESHOLD,
            smoothing_window: 3,
            trend_window: 5,
            weekly_window: 7,
            dashboard_interval_hours: 24,
            history_file: PathBuf::from("history.json"),
            symbols: SymbolConfig::default(),
            regime_thresholds: RegimeThresholds::default(),
        }
    }
}

impl ScannerConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be at least 1".into()));
        }
        for (name, len) in [
            ("smoothing_window", self.smoothing_window),
            ("trend_window", self.trend_window),
            ("weekly_window", self.weekly_window),
        ] {
            if len == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }
        if self.dashboard_interval_hours <= 0 {
            return Err(ConfigError::Invalid("dashboard_interval_hours must be positive".into()));
        }
        if self.early_warning_threshold.is_nan() || self.early_warning_threshold <= EARLY_WARNING_FLOOR {
            return Err(ConfigError::Invalid(format!(
                "early_warning_threshold must be above {}",
                EARLY_WARNING_FLOOR
            )));
        }
        let t = &self.regime_thresholds;
        if !(t.transition < t.early_phase_1
            && t.early_phase_1 < t.confirmed_phase_1
            && t.confirmed_phase_1 < t.late_phase_1)
        {
            return Err(ConfigError::Invalid("regime thresholds must be strictly increasing".into()));
        }
        Ok(())
    }

    pub fn capacities(&self) -> BufferCapacities {
        BufferCapacities {
            smoothing: self.smoothing_window,
            trend: self.trend_window,
            weekly: self.weekly_window,
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn dashboard_interval(&self) -> Duration {
        Duration::hours(self.dashboard_interval_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.poll_interval_secs, 600);
        assert_eq!(config.early_warning_threshold, -0.25);
        assert_eq!(config.capacities(), BufferCapacities::default());
        assert_eq!(config.dashboard_interval(), Duration::hours(24));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: ScannerConfig = toml::from_str(
            r#"
            poll_interval_secs = 60
            history_file = "/var/lib/vix/history.json"

            [symbols]
            vx2 = "VXZ"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.history_file, PathBuf::from("/var/lib/vix/history.json"));
        assert_eq!(config.symbols.vx2, "VXZ");
        assert_eq!(config.symbols.vix, "^VIX");
        assert_eq!(config.weekly_window, 7);
    }

    #[test]
    fn test_validation() {
        let bad_window = ScannerConfig {
            trend_window: 0,
            ..Default::default()
        };
        assert!(bad_window.validate().is_err());

        let empty_band = ScannerConfig {
            early_warning_threshold: -0.6,
            ..Default::default()
        };
        assert!(empty_band.validate().is_err());

        let bad_thresholds = ScannerConfig {
            regime_thresholds: RegimeThresholds {
                transition: 50,
                early_phase_1: 50,
                confirmed_phase_1: 70,
                late_phase_1: 85,
            },
            ..Default::default()
        };
        assert!(bad_thresholds.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ScannerConfig::load(Path::new("/nonexistent/vix-scanner.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
