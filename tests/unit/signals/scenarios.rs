//! Market scenarios run through the full evaluation pipeline

use crate::common_candles::{
    bear_bounce_closes, bull_dip_closes, candles_from_closes, crash_closes, rally_closes,
};
use trendgate::config::EngineConfig;
use trendgate::indicators::IndicatorError;
use trendgate::models::signal::{
    GuardState, InstrumentState, MarketRegime, PositionState, TradeAction,
};
use trendgate::signals::engine::{SignalEngine, SignalInput};
use trendgate::signals::regime::RegimeChange;

fn short_engine() -> SignalEngine {
    SignalEngine::new(EngineConfig {
        allow_short: true,
        ..EngineConfig::default()
    })
}

#[test]
fn scenario_bull_trend_with_dip_enters_long() {
    let engine = SignalEngine::default();
    let regime = engine.classify(100.2, 100.0);
    assert_eq!(regime, MarketRegime::Bull);

    let action = engine.decide(&SignalInput {
        regime,
        momentum: 25.0,
        position: PositionState::Flat,
        guard: GuardState::Clear,
    });
    assert_eq!(action, TradeAction::EnterLong);
}

#[test]
fn scenario_price_inside_deadband_holds() {
    let engine = SignalEngine::default();
    let regime = engine.classify(100.05, 100.0);
    assert_eq!(regime, MarketRegime::Bear);

    let action = engine.decide(&SignalInput {
        regime,
        momentum: 25.0,
        position: PositionState::Flat,
        guard: GuardState::Clear,
    });
    assert_eq!(action, TradeAction::Hold);
}

#[test]
fn scenario_long_exit_thresholds() {
    let engine = SignalEngine::default();
    let long = |momentum| SignalInput {
        regime: MarketRegime::Bull,
        momentum,
        position: PositionState::Long,
        guard: GuardState::Clear,
    };
    assert_eq!(engine.decide(&long(66.0)), TradeAction::ExitLong);
    assert_eq!(engine.decide(&long(64.0)), TradeAction::Hold);
}

#[test]
fn scenario_panic_override_in_bear() {
    let engine = SignalEngine::default();
    let action = engine.decide(&SignalInput {
        regime: MarketRegime::Bear,
        momentum: 10.0,
        position: PositionState::Flat,
        guard: GuardState::Clear,
    });
    assert_eq!(action, TradeAction::EnterLong);
}

#[test]
fn scenario_anti_churn_holds_until_exit_threshold() {
    let engine = SignalEngine::default();
    let readings = [25.0, 40.0, 55.0, 64.9, 50.0, 31.0, 65.0, 60.0];
    for momentum in readings {
        let action = engine.decide(&SignalInput {
            regime: MarketRegime::Bull,
            momentum,
            position: PositionState::Long,
            guard: GuardState::Clear,
        });
        assert_eq!(action, TradeAction::Hold, "momentum {momentum}");
    }

    let crossing = engine.decide(&SignalInput {
        regime: MarketRegime::Bull,
        momentum: 65.01,
        position: PositionState::Long,
        guard: GuardState::Clear,
    });
    assert_eq!(crossing, TradeAction::ExitLong);
}

#[test]
fn pipeline_bull_dip_enters_long_and_records_regime() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&bull_dip_closes());
    let state = InstrumentState::new("BTC");

    let (evaluation, next) = engine.evaluate(&candles, &state, GuardState::Clear).unwrap();
    assert_eq!(evaluation.regime, MarketRegime::Bull);
    assert_eq!(evaluation.action, TradeAction::EnterLong);
    assert_eq!(evaluation.regime_change, None);
    assert_eq!(next.last_regime, Some(MarketRegime::Bull));
    assert_eq!(next.position, PositionState::Flat);
    assert!(!evaluation.trend_filtered);
}

#[test]
fn pipeline_dip_below_a_wide_buffer_is_filtered() {
    // 299 < 237.4 * 1.5, so the same dip reads as BEAR
    let engine = SignalEngine::new(EngineConfig {
        buffer_fraction: 0.5,
        ..EngineConfig::default()
    });
    let candles = candles_from_closes(&bull_dip_closes());
    let state = InstrumentState::new("BTC");

    let (evaluation, _) = engine.evaluate(&candles, &state, GuardState::Clear).unwrap();
    assert_eq!(evaluation.regime, MarketRegime::Bear);
    assert_eq!(evaluation.action, TradeAction::Hold);
    assert!(evaluation.trend_filtered);
}

#[test]
fn pipeline_crash_triggers_panic_entry_and_reports_regime_flip() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&crash_closes());
    let state = InstrumentState {
        symbol: "ETH".to_string(),
        position: PositionState::Flat,
        last_regime: Some(MarketRegime::Bull),
    };

    let (evaluation, next) = engine.evaluate(&candles, &state, GuardState::Clear).unwrap();
    assert_eq!(evaluation.regime, MarketRegime::Bear);
    assert_eq!(evaluation.action, TradeAction::EnterLong);
    assert_eq!(
        evaluation.regime_change,
        Some(RegimeChange {
            from: MarketRegime::Bull,
            to: MarketRegime::Bear,
        })
    );
    assert_eq!(next.last_regime, Some(MarketRegime::Bear));
    assert!(!evaluation.trend_filtered);
}

#[test]
fn pipeline_last_regime_does_not_change_the_action() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&bull_dip_closes());
    let mut actions = Vec::new();
    for last_regime in [None, Some(MarketRegime::Bull), Some(MarketRegime::Bear)] {
        let state = InstrumentState {
            symbol: "BTC".to_string(),
            position: PositionState::Flat,
            last_regime,
        };
        let (evaluation, _) = engine.evaluate(&candles, &state, GuardState::Clear).unwrap();
        actions.push(evaluation.action);
    }
    assert!(actions.iter().all(|a| *a == TradeAction::EnterLong));
}

#[test]
fn pipeline_guarded_instrument_holds() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&crash_closes());
    let state = InstrumentState::new("ETH");
    let (evaluation, _) = engine.evaluate(&candles, &state, GuardState::Pending).unwrap();
    assert_eq!(evaluation.action, TradeAction::Hold);
}

#[test]
fn pipeline_rally_exits_long() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&rally_closes());
    let state = InstrumentState::new("BTC").with_position(PositionState::Long);
    let (evaluation, _) = engine.evaluate(&candles, &state, GuardState::Clear).unwrap();
    assert!(evaluation.indicators.momentum_value() > 65.0);
    assert_eq!(evaluation.action, TradeAction::ExitLong);
}

#[test]
fn pipeline_bear_bounce_shorts_only_when_enabled() {
    let candles = candles_from_closes(&bear_bounce_closes());
    let state = InstrumentState::new("SOL");

    let (long_only, _) = SignalEngine::default()
        .evaluate(&candles, &state, GuardState::Clear)
        .unwrap();
    assert_eq!(long_only.regime, MarketRegime::Bear);
    assert_eq!(long_only.action, TradeAction::Hold);

    let (with_short, _) = short_engine()
        .evaluate(&candles, &state, GuardState::Clear)
        .unwrap();
    assert_eq!(with_short.action, TradeAction::EnterShort);
}

#[test]
fn pipeline_short_covers_on_crash() {
    let candles = candles_from_closes(&crash_closes());
    let state = InstrumentState::new("SOL").with_position(PositionState::Short);
    let (evaluation, _) = short_engine()
        .evaluate(&candles, &state, GuardState::Clear)
        .unwrap();
    assert_eq!(evaluation.action, TradeAction::ExitShort);
}

#[test]
fn pipeline_short_history_is_skipped() {
    let engine = SignalEngine::default();
    let candles = candles_from_closes(&bull_dip_closes()[..150]);
    let state = InstrumentState::new("BTC");
    let err = engine
        .evaluate(&candles, &state, GuardState::Clear)
        .unwrap_err();
    assert_eq!(
        err,
        IndicatorError::InsufficientHistory {
            required: 201,
            actual: 150,
        }
    );
}
