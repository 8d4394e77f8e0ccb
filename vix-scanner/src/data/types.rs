//! Core market data types for the scanner.
//!
//! A `MarketSnapshot` is one poll of the volatility complex. `vx1` and `vx2`
//! are the short-term volatility ETF proxies; `vx3` is a synthetic
//! longer-dated proxy filled in by the snapshot source.

use serde::{Deserialize, Serialize};

/// One poll of the tracked volatility indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Volatility index.
    pub vix: f64,
    /// Volatility-of-volatility index.
    pub vvix: f64,
    /// Equity index level.
    pub spx: f64,
    /// Front volatility product proxy.
    pub vx1: f64,
    /// Second volatility product proxy.
    pub vx2: f64,
    /// Synthetic longer-dated proxy (`vx2 * 1.01`).
    pub vx3: f64,
}

impl MarketSnapshot {
    /// Front-minus-second proxy spread.
    pub fn spread(&self) -> f64 {
        self.vx1 - self.vx2
    }

    /// `vx1 < vx2`: the proxies are in contango.
    pub fn is_contango(&self) -> bool {
        self.vx1 < self.vx2
    }

    /// `vx1 < vx2 < vx3`: the full curve slopes upward.
    pub fn is_full_contango(&self) -> bool {
        self.vx1 < self.vx2 && self.vx2 < self.vx3
    }

    /// `vx1 > vx2 > vx3`: the full curve is inverted.
    pub fn is_full_backwardation(&self) -> bool {
        self.vx1 > self.vx2 && self.vx2 > self.vx3
    }
}

/// Tick-over-tick changes derived from a snapshot and the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Changes {
    /// VIX percent change.
    pub vix_change: f64,
    /// VVIX percent change.
    pub vvix_change: f64,
    /// SPX percent change.
    pub spx_change: f64,
    /// `vx1 - vx2` for the current snapshot.
    pub spread: f64,
    /// Current spread is below the previous spread.
    pub spread_trending_down: bool,
}
