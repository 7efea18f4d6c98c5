//! Market data provider interface

use crate::models::indicators::Candle;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid {field} in candle for {symbol}: {value:?}")]
    InvalidField {
        symbol: String,
        field: &'static str,
        value: String,
    },

    #[error("unsupported candle interval: {0}")]
    UnsupportedInterval(String),

    #[error("market data unavailable for {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the most recent `limit` candles for a symbol, oldest first.
    async fn get_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, MarketDataError>;
}
