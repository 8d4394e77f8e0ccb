//! Option entry guidance per regime.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::regime::RegimeState;

/// Offset added to spot VIX for the suggested strike.
const STRIKE_OFFSET: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Advisory text and levels for a regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionGuidance {
    pub delta_range: &'static str,
    pub dte_range: &'static str,
    pub note: &'static str,
    pub suggested_strike: Option<Decimal>,
    pub breakeven: Option<Decimal>,
}

/// Guidance for entering VIX puts in `regime` with spot VIX at `vix`.
///
/// Strike and breakeven are only given for entry regimes.
pub fn option_guidance(regime: RegimeState, vix: f64) -> OptionGuidance {
    let (delta_range, dte_range, note) = match regime {
        RegimeState::EarlyPhase1 => ("0.35–0.45", "45–75", "Starter position allowed"),
        RegimeState::ConfirmedPhase1 => ("0.35–0.55", "45–75", "Primary entry window"),
        RegimeState::LatePhase1 => ("n/a", "n/a", "Scale out, avoid new entries"),
        RegimeState::Panic | RegimeState::Transition => ("n/a", "n/a", "Avoid new positions"),
    };

    let suggested_strike = if regime.favors_entry() {
        Decimal::try_from(vix)
            .ok()
            .map(|v| (v + STRIKE_OFFSET).round_dp(2))
    } else {
        None
    };
    let breakeven = suggested_strike.map(|s| (s - STRIKE_OFFSET).round_dp(2));

    OptionGuidance {
        delta_range,
        dte_range,
        note,
        suggested_strike,
        breakeven,
    }
}

impl fmt::Display for OptionGuidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(
            f,
            "Delta: {} | DTE: {} | Note: {}",
            self.delta_range, self.dte_range, self.note
        )?;
        writeln!(f, "Suggested Strike: {}", level(self.suggested_strike))?;
        write!(f, "Estimated Breakeven: {}", level(self.breakeven))
    }
}
