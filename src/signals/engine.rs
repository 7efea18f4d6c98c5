//! Hysteresis signal engine.
//!
//! Rules, first match wins:
//! 1. an order in flight holds
//! 2. FLAT: panic override, then regime-filtered long entry, then short entry
//! 3. LONG: exit above the long exit threshold
//! 4. SHORT: exit below the short exit threshold
//!
//! Every comparison is strict, so a reading sitting exactly on a threshold
//! never triggers.

use crate::config::{EngineConfig, SignalThresholds};
use crate::indicators::{compute_indicators, IndicatorError};
use crate::models::indicators::{Candle, IndicatorSet};
use crate::models::signal::{GuardState, InstrumentState, MarketRegime, PositionState, TradeAction};
use crate::signals::regime::{classify_regime, detect_regime_change, RegimeChange};

/// Everything the state machine looks at for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub regime: MarketRegime,
    pub momentum: f64,
    pub position: PositionState,
    pub guard: GuardState,
}

/// Outcome of one per-instrument evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub indicators: IndicatorSet,
    pub regime: MarketRegime,
    pub action: TradeAction,
    /// Side observation for logging, never fed back into `decide`.
    pub regime_change: Option<RegimeChange>,
    /// A long entry momentum reading suppressed by the BEAR regime.
    pub trend_filtered: bool,
}

/// Pure transition function of the state machine.
pub fn decide_action(
    input: &SignalInput,
    thresholds: &SignalThresholds,
    allow_short: bool,
) -> TradeAction {
    if input.guard == GuardState::Pending {
        return TradeAction::Hold;
    }

    let momentum = input.momentum;
    match input.position {
        PositionState::Flat => {
            if momentum < thresholds.panic {
                TradeAction::EnterLong
            } else if input.regime == MarketRegime::Bull && momentum < thresholds.long_entry {
                TradeAction::EnterLong
            } else if allow_short
                && input.regime == MarketRegime::Bear
                && momentum > thresholds.short_entry
            {
                TradeAction::EnterShort
            } else {
                TradeAction::Hold
            }
        }
        // A regime flip alone never exits; only momentum does.
        PositionState::Long if momentum > thresholds.long_exit => TradeAction::ExitLong,
        PositionState::Short if momentum < thresholds.short_exit => TradeAction::ExitShort,
        PositionState::Long | PositionState::Short => TradeAction::Hold,
    }
}

/// Whether momentum would have entered long from FLAT but the regime filter
/// held it back. Readings under the panic threshold are never filtered.
pub fn is_trend_filtered(input: &SignalInput, thresholds: &SignalThresholds) -> bool {
    input.position == PositionState::Flat
        && input.regime == MarketRegime::Bear
        && input.momentum < thresholds.long_entry
        && input.momentum >= thresholds.panic
}

pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classify(&self, price: f64, trend_value: f64) -> MarketRegime {
        classify_regime(price, trend_value, self.config.buffer_fraction)
    }

    pub fn decide(&self, input: &SignalInput) -> TradeAction {
        decide_action(input, &self.config.thresholds, self.config.allow_short)
    }

    /// Run snapshot -> indicators -> regime -> action for one instrument.
    ///
    /// Returns the evaluation and the instrument record with its last regime
    /// updated. `InsufficientHistory` means the instrument sits this cycle out.
    pub fn evaluate(
        &self,
        candles: &[Candle],
        state: &InstrumentState,
        guard: GuardState,
    ) -> Result<(Evaluation, InstrumentState), IndicatorError> {
        let indicators = compute_indicators(candles, self.config.trend_window)?;
        let regime = self.classify(indicators.price, indicators.trend_value());

        let input = SignalInput {
            regime,
            momentum: indicators.momentum_value(),
            position: state.position,
            guard,
        };
        let action = self.decide(&input);
        let trend_filtered = is_trend_filtered(&input, &self.config.thresholds);

        let regime_change = detect_regime_change(state.last_regime, regime);
        let next_state = InstrumentState {
            last_regime: Some(regime),
            ..state.clone()
        };

        Ok((
            Evaluation {
                indicators,
                regime,
                action,
                regime_change,
                trend_filtered,
            },
            next_state,
        ))
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
