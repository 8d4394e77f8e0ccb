//! Tick-over-tick change computation and the fake-spike filter.

use thiserror::Error;

use crate::data::{Changes, MarketSnapshot};
use crate::regime::RegimeState;

/// Change computation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("Previous {metric} is zero, cannot compute percent change")]
    ZeroPrevious { metric: &'static str },
}

/// Last settled tick: prices, spread and regime.
///
/// Empty until the first tick completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousState {
    pub vix: Option<f64>,
    pub vvix: Option<f64>,
    pub spx: Option<f64>,
    pub spread: Option<f64>,
    pub regime: Option<RegimeState>,
}

impl PreviousState {
    /// Replace the remembered values with the current tick's.
    pub fn commit(&mut self, snapshot: &MarketSnapshot, spread: f64, regime: RegimeState) {
        self.vix = Some(snapshot.vix);
        self.vvix = Some(snapshot.vvix);
        self.spx = Some(snapshot.spx);
        self.spread = Some(spread);
        self.regime = Some(regime);
    }
}

fn percent_change(
    metric: &'static str,
    current: f64,
    previous: Option<f64>,
) -> Result<f64, ComputeError> {
    match previous {
        None => Ok(0.0),
        Some(prev) if prev == 0.0 => Err(ComputeError::ZeroPrevious { metric }),
        Some(prev) => Ok((current - prev) / prev * 100.0),
    }
}

/// Derive `Changes` from the current snapshot and the previous tick.
///
/// Without a previous tick every percent change is exactly zero and the
/// spread is not trending down.
pub fn compute_changes(
    snapshot: &MarketSnapshot,
    previous: &PreviousState,
) -> Result<Changes, ComputeError> {
    let spread = snapshot.spread();

    Ok(Changes {
        vix_change: percent_change("vix", snapshot.vix, previous.vix)?,
        vvix_change: percent_change("vvix", snapshot.vvix, previous.vvix)?,
        spx_change: percent_change("spx", snapshot.spx, previous.spx)?,
        spread,
        spread_trending_down: previous.spread.is_some_and(|prev| spread < prev),
    })
}

/// Fake spike: VIX and VVIX both rising into a fully inverted curve.
///
/// When this fires the tick ends without scoring.
pub fn is_fake_spike(snapshot: &MarketSnapshot, changes: &Changes) -> bool {
    changes.vix_change > 0.0 && changes.vvix_change > 0.0 && snapshot.is_full_backwardation()
}
