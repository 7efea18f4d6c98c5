//! Moving-average primitives shared by the indicators

/// Simple mean of a slice. `None` for an empty slice.
pub fn sma(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Exponential moving average of the whole series.
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = ema + k * (value - ema)` with `k = 2 / (period + 1)`.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = sma(&values[..period])?;

    Some(
        values[period..]
            .iter()
            .fold(seed, |ema, &value| ema + k * (value - ema)),
    )
}

/// One step of Wilder's recursive average.
pub fn wilder_smooth(previous: f64, value: f64, period: usize) -> f64 {
    let n = period as f64;
    (previous * (n - 1.0) + value) / n
}

/// RSI from smoothed average gain and loss, scaled to 0-100.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        // flat series
        50.0
    } else {
        100.0 * avg_gain / total
    }
}
