//! Regime classification against the trend line

use crate::models::signal::MarketRegime;

/// Classify price against the trend value.
///
/// BULL only when price clears `trend * (1 + buffer)`. The band between the
/// trend line and that level, and the boundary itself, count as BEAR.
pub fn classify_regime(price: f64, trend_value: f64, buffer_fraction: f64) -> MarketRegime {
    if price > trend_value * (1.0 + buffer_fraction) {
        MarketRegime::Bull
    } else {
        MarketRegime::Bear
    }
}

/// A regime transition observed between two evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeChange {
    pub from: MarketRegime,
    pub to: MarketRegime,
}

/// Compare the fresh regime with the previously observed one.
///
/// `None` on the first observation or when nothing changed.
pub fn detect_regime_change(
    previous: Option<MarketRegime>,
    current: MarketRegime,
) -> Option<RegimeChange> {
    match previous {
        Some(from) if from != current => Some(RegimeChange { from, to: current }),
        _ => None,
    }
}
