//! RSI (Relative Strength Index) indicator
//!
//! Wilder smoothing of average gain and average loss:
//! RSI = 100 * avg_gain / (avg_gain + avg_loss)

use crate::common::math;
use crate::models::indicators::{Candle, RsiIndicator};

pub const DEFAULT_RSI_PERIOD: u32 = 14;

/// Calculate the RSI series over the closes.
///
/// Element `i` is the RSI after the `period + i`-th delta. Empty when fewer
/// than `period + 1` closes are supplied.
pub fn rsi_series(candles: &[Candle], period: u32) -> Vec<f64> {
    let period = period as usize;
    if period == 0 || candles.len() < period + 1 {
        return Vec::new();
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|pair| {
            let change = pair[1].close - pair[0].close;
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(gains.len() - period + 1);
    series.push(math::rsi_from_averages(avg_gain, avg_loss));

    for (gain, loss) in gains[period..].iter().zip(&losses[period..]) {
        avg_gain = math::wilder_smooth(avg_gain, *gain, period);
        avg_loss = math::wilder_smooth(avg_loss, *loss, period);
        series.push(math::rsi_from_averages(avg_gain, avg_loss));
    }

    series
}

/// Calculate the latest RSI reading, with the reading one bar earlier.
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<RsiIndicator> {
    let series = rsi_series(candles, period);
    let value = *series.last()?;
    let previous = series.len().checked_sub(2).map(|i| series[i]);

    Some(RsiIndicator {
        value,
        previous,
        period,
    })
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Option<RsiIndicator> {
    calculate_rsi(candles, DEFAULT_RSI_PERIOD)
}
