//! Trend + momentum readings for one price snapshot

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_rsi, DEFAULT_RSI_PERIOD};
use crate::indicators::trend::calculate_ema;
use crate::models::indicators::{Candle, IndicatorSet};

/// Closes needed to evaluate a snapshot with the given trend window.
pub fn required_history(trend_window: u32) -> usize {
    trend_window as usize + 1
}

/// Compute the trend (EMA over `trend_window`) and momentum (RSI-14)
/// readings for the last bar of `candles`.
///
/// Fails with [`IndicatorError::InsufficientHistory`] when fewer than
/// `trend_window + 1` closes are supplied.
pub fn compute_indicators(
    candles: &[Candle],
    trend_window: u32,
) -> Result<IndicatorSet, IndicatorError> {
    let required = required_history(trend_window).max(DEFAULT_RSI_PERIOD as usize + 1);
    if candles.len() < required {
        return Err(IndicatorError::InsufficientHistory {
            required,
            actual: candles.len(),
        });
    }

    if let Some(index) = candles.iter().position(|c| !c.close.is_finite()) {
        return Err(IndicatorError::InvalidPrice { index });
    }

    let insufficient = || IndicatorError::InsufficientHistory {
        required,
        actual: candles.len(),
    };
    let trend = calculate_ema(candles, trend_window).ok_or_else(insufficient)?;
    let momentum = calculate_rsi(candles, DEFAULT_RSI_PERIOD).ok_or_else(insufficient)?;
    let price = candles.last().map(|c| c.close).ok_or_else(insufficient)?;

    Ok(IndicatorSet {
        price,
        trend,
        momentum,
    })
}
