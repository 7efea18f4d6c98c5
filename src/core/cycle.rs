//! Decision cycle driver
//!
//! One tick walks the configured instruments in order, so two cycles for the
//! same instrument never overlap. Per instrument: refresh position and guard
//! from the broker, fetch a snapshot, evaluate, forward any action.

use crate::config::WorkerConfig;
use crate::indicators::IndicatorError;
use crate::models::indicators::Candle;
use crate::models::signal::{InstrumentState, MarketRegime, TradeAction};
use crate::services::execution::{
    size_entry, ExecutionError, OrderExecutor, OrderRequest, SizingRejection,
};
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use crate::signals::engine::{Evaluation, SignalEngine};
use crate::signals::guard::OrderGuard;
use backon::{ExponentialBuilder, Retryable};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Momentum outside this band gets a "watch" log line.
const WATCH_BAND: (f64, f64) = (35.0, 65.0);

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("market data: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),

    #[error("indicators: {0}")]
    Indicator(#[from] IndicatorError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Snapshot too short for the trend window.
    Buffering { required: usize, actual: usize },
    Sizing(SizingRejection),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Acted(OrderRequest),
    Held,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub symbol: String,
    pub regime: Option<MarketRegime>,
    pub momentum: Option<f64>,
    pub action: Option<TradeAction>,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    fn skipped(symbol: &str, reason: SkipReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            regime: None,
            momentum: None,
            action: None,
            outcome: CycleOutcome::Skipped(reason),
        }
    }
}

pub struct DecisionCycle {
    engine: SignalEngine,
    provider: Arc<dyn MarketDataProvider>,
    executor: Arc<dyn OrderExecutor>,
    symbols: Vec<String>,
    history_limit: usize,
    instruments: HashMap<String, InstrumentState>,
    guard: OrderGuard,
    retry: ExponentialBuilder,
}

impl DecisionCycle {
    pub fn new(
        config: &WorkerConfig,
        provider: Arc<dyn MarketDataProvider>,
        executor: Arc<dyn OrderExecutor>,
    ) -> Self {
        let instruments = config
            .symbols
            .iter()
            .map(|symbol| (symbol.clone(), InstrumentState::new(symbol.clone())))
            .collect();

        Self {
            engine: SignalEngine::new(config.engine.clone()),
            provider,
            executor,
            symbols: config.symbols.clone(),
            history_limit: config.history_limit(),
            instruments,
            guard: OrderGuard::new(),
            retry: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(250))
                .with_max_times(3),
        }
    }

    /// Replace the fetch retry policy.
    pub fn with_retry(mut self, retry: ExponentialBuilder) -> Self {
        self.retry = retry;
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn instrument(&self, symbol: &str) -> Option<&InstrumentState> {
        self.instruments.get(symbol)
    }

    pub fn guard(&self) -> &OrderGuard {
        &self.guard
    }

    /// Run one poll tick over every instrument.
    pub async fn run_tick(&mut self) -> Vec<CycleReport> {
        info!(
            symbol_count = self.symbols.len(),
            "DecisionCycle: tick start for {} symbols",
            self.symbols.len()
        );

        let symbols = self.symbols.clone();
        let mut reports = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let report = match self.run_instrument(symbol).await {
                Ok(report) => report,
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "DecisionCycle: cycle failed for {}", symbol);
                    CycleReport::skipped(symbol, SkipReason::Failed(e.to_string()))
                }
            };
            reports.push(report);
        }

        info!("DecisionCycle: tick complete");
        reports
    }

    /// Run the cycle for a single instrument.
    pub async fn run_instrument(&mut self, symbol: &str) -> Result<CycleReport, CycleError> {
        // Guard before position, so a fill landing in between is seen as held.
        if self.guard.is_guarded(symbol) && !self.executor.has_open_order(symbol).await? {
            self.guard.clear_guard(symbol);
        }
        let position = self.executor.position(symbol).await?;

        let candles = self.fetch_candles(symbol).await?;

        let state = self
            .instruments
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| InstrumentState::new(symbol))
            .with_position(position);

        let (evaluation, next_state) =
            match self.engine.evaluate(&candles, &state, self.guard.state(symbol)) {
                Ok(result) => result,
                Err(IndicatorError::InsufficientHistory { required, actual }) => {
                    info!(
                        symbol = %symbol,
                        required,
                        actual,
                        "DecisionCycle: buffering history for {} ({}/{})",
                        symbol,
                        actual,
                        required
                    );
                    self.instruments.insert(symbol.to_string(), state);
                    return Ok(CycleReport::skipped(
                        symbol,
                        SkipReason::Buffering { required, actual },
                    ));
                }
                Err(e) => return Err(e.into()),
            };
        self.instruments.insert(symbol.to_string(), next_state);

        log_evaluation(symbol, &evaluation);

        let outcome = if evaluation.action.is_hold() {
            CycleOutcome::Held
        } else {
            self.forward(symbol, &evaluation).await?
        };

        Ok(CycleReport {
            symbol: symbol.to_string(),
            regime: Some(evaluation.regime),
            momentum: Some(evaluation.indicators.momentum_value()),
            action: Some(evaluation.action),
            outcome,
        })
    }

    async fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, MarketDataError> {
        let provider = Arc::clone(&self.provider);
        let owned_symbol = symbol.to_string();
        let limit = self.history_limit;

        let fetch = || {
            let provider = Arc::clone(&provider);
            let symbol = owned_symbol.clone();
            async move { provider.get_candles(&symbol, limit).await }
        };

        fetch
            .retry(self.retry.clone())
            .notify(|e: &MarketDataError, delay: Duration| {
                warn!(
                    symbol = %symbol,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "DecisionCycle: candle fetch failed for {}, retrying",
                    symbol
                );
            })
            .await
    }

    /// Size and submit the order for a non-HOLD action, then set the guard.
    async fn forward(
        &mut self,
        symbol: &str,
        evaluation: &Evaluation,
    ) -> Result<CycleOutcome, CycleError> {
        let action = evaluation.action;
        let price = evaluation.indicators.price;

        let quantity = if action.is_entry() {
            let config = self.engine.config();
            let cash = self.executor.cash_balance().await?;
            match size_entry(
                symbol,
                cash,
                price,
                config.allocation_fraction,
                config.min_cash,
            ) {
                Ok(quantity) => quantity,
                Err(rejection) => {
                    warn!(
                        symbol = %symbol,
                        action = %action,
                        cash,
                        "DecisionCycle: {} skipped for {}: {:?}",
                        action,
                        symbol,
                        rejection
                    );
                    return Ok(CycleOutcome::Skipped(SkipReason::Sizing(rejection)));
                }
            }
        } else {
            self.executor.position_quantity(symbol).await?.abs()
        };

        let Some(order) = OrderRequest::for_action(symbol, action, quantity, price) else {
            return Ok(CycleOutcome::Held);
        };

        self.executor.submit(&order).await?;
        self.guard.set_guard(symbol);

        info!(
            symbol = %symbol,
            action = %action,
            quantity,
            price,
            "DecisionCycle: {} {} x{} @ {:.5}",
            action,
            symbol,
            quantity,
            price
        );
        Ok(CycleOutcome::Acted(order))
    }
}

fn log_evaluation(symbol: &str, evaluation: &Evaluation) {
    let indicators = &evaluation.indicators;
    let momentum = indicators.momentum_value();

    if let Some(change) = evaluation.regime_change {
        info!(
            symbol = %symbol,
            from = %change.from,
            to = %change.to,
            "DecisionCycle: regime change for {}: {} -> {}",
            symbol,
            change.from,
            change.to
        );
    }

    if momentum < WATCH_BAND.0 || momentum > WATCH_BAND.1 {
        info!(
            symbol = %symbol,
            previous = ?indicators.momentum.previous,
            current = momentum,
            "DecisionCycle: watch {} (momentum {:?} -> {:.1})",
            symbol,
            indicators.momentum.previous,
            momentum
        );
    }

    if evaluation.trend_filtered {
        info!(
            symbol = %symbol,
            momentum,
            regime = %evaluation.regime,
            "DecisionCycle: filtered {}: momentum {:.1} entry rejected by {} regime",
            symbol,
            momentum,
            evaluation.regime
        );
    }

    debug!(
        symbol = %symbol,
        price = indicators.price,
        momentum,
        trend = indicators.trend_value(),
        regime = %evaluation.regime,
        action = %evaluation.action,
        "DecisionCycle: {} | px {:.4} | momentum {:.1} | trend {:.4} ({})",
        symbol,
        indicators.price,
        momentum,
        indicators.trend_value(),
        evaluation.regime
    );
}
