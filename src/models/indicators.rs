use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. The engine only reads `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    /// RSI one bar before `value`, when the series is long enough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
    pub period: u32,
}

/// Trend and momentum readings derived from one price snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// Last close of the snapshot.
    pub price: f64,
    pub trend: EmaIndicator,
    pub momentum: RsiIndicator,
}

impl IndicatorSet {
    pub fn trend_value(&self) -> f64 {
        self.trend.value
    }

    pub fn momentum_value(&self) -> f64 {
        self.momentum.value
    }
}
