//! Candle snapshots over the Hyperliquid `/info` endpoint

use crate::models::indicators::Candle;
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request body for `POST /info`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest {
    CandleSnapshot { req: CandleSnapshotRequest },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSnapshotRequest {
    pub coin: String,
    pub interval: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// Candle as returned by Hyperliquid; prices and volume are strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCandle {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "T")]
    pub close_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "n", default)]
    pub trades: u64,
}

impl RawCandle {
    pub fn into_candle(self) -> Result<Candle, MarketDataError> {
        let parse = |field: &'static str, value: &str| -> Result<f64, MarketDataError> {
            value.parse::<f64>().map_err(|_| MarketDataError::InvalidField {
                symbol: self.symbol.clone(),
                field,
                value: value.to_string(),
            })
        };

        let open = parse("open", &self.open)?;
        let high = parse("high", &self.high)?;
        let low = parse("low", &self.low)?;
        let close = parse("close", &self.close)?;
        let volume = parse("volume", &self.volume)?;

        // Close time stamps the bar
        let timestamp = DateTime::from_timestamp_millis(self.close_time).unwrap_or_else(Utc::now);

        Ok(Candle::new(open, high, low, close, volume, timestamp))
    }
}

/// Length of a candle interval such as "15m" or "1h", in milliseconds.
pub fn interval_millis(interval: &str) -> Option<i64> {
    let (split, unit) = interval.char_indices().last()?;
    let amount: i64 = interval[..split].parse().ok().filter(|n| *n > 0)?;
    let unit_ms: i64 = match unit {
        'm' => 60_000,
        'h' => 3_600_000,
        'd' => 86_400_000,
        'w' => 604_800_000,
        _ => return None,
    };
    amount.checked_mul(unit_ms)
}

pub struct HyperliquidRestClient {
    base_url: String,
    client: reqwest::Client,
    interval: String,
}

impl HyperliquidRestClient {
    pub fn new(base_url: impl Into<String>, interval: impl Into<String>) -> Self {
        Self::with_client(base_url, interval, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        interval: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            interval: interval.into(),
        }
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Fetch candles for `coin` between `start_time` and `end_time` (ms).
    pub async fn candle_snapshot(
        &self,
        coin: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let request = InfoRequest::CandleSnapshot {
            req: CandleSnapshotRequest {
                coin: coin.to_string(),
                interval: self.interval.clone(),
                start_time,
                end_time,
            },
        };

        let response = self
            .client
            .post(format!("{}/info", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Vec<RawCandle> = response.json().await?;
        let mut candles = raw
            .into_iter()
            .map(RawCandle::into_candle)
            .collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|c| c.timestamp);

        debug!(
            coin = %coin,
            count = candles.len(),
            "HyperliquidRestClient: fetched {} candles for {}",
            candles.len(),
            coin
        );
        Ok(candles)
    }
}

#[async_trait]
impl MarketDataProvider for HyperliquidRestClient {
    async fn get_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, MarketDataError> {
        let step = interval_millis(&self.interval)
            .ok_or_else(|| MarketDataError::UnsupportedInterval(self.interval.clone()))?;

        let end_time = Utc::now().timestamp_millis();
        let start_time = end_time - step * limit as i64;
        let mut candles = self.candle_snapshot(symbol, start_time, end_time).await?;

        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }
}
