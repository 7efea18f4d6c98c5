//! Unit tests for configuration loading and validation

use std::collections::HashMap;
use trendgate::config::{ConfigError, EngineConfig, SignalThresholds, WorkerConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let config = WorkerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.engine.trend_window, 200);
    assert_eq!(config.engine.thresholds, SignalThresholds::default());
    assert!(!config.engine.allow_short);
    assert_eq!(config.poll_interval_seconds, 10);
    assert_eq!(config.history_limit(), 251);
}

#[test]
fn test_empty_environment_yields_defaults() {
    let config = WorkerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, WorkerConfig::default());
}

#[test]
fn test_overrides_are_parsed() {
    let config = WorkerConfig::from_lookup(lookup(&[
        ("SYMBOLS", "BTC, ETH ,,"),
        ("POLL_INTERVAL_SECONDS", "30"),
        ("TREND_WINDOW", "50"),
        ("ALLOW_SHORT", "true"),
        ("BUFFER_FRACTION", "0"),
        ("CANDLE_INTERVAL", "1h"),
    ]))
    .unwrap();

    assert_eq!(config.symbols, vec!["BTC".to_string(), "ETH".to_string()]);
    assert_eq!(config.poll_interval_seconds, 30);
    assert_eq!(config.engine.trend_window, 50);
    assert!(config.engine.allow_short);
    assert_eq!(config.engine.buffer_fraction, 0.0);
    assert_eq!(config.candle_interval, "1h");
}

#[test]
fn test_unparseable_value_is_reported() {
    let err = EngineConfig::from_lookup(lookup(&[("TREND_WINDOW", "two hundred")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidValue {
            key: "TREND_WINDOW".to_string(),
            value: "two hundred".to_string(),
        }
    );
}

#[test]
fn test_zero_hysteresis_gap_fails_fast() {
    let thresholds = SignalThresholds {
        long_exit: 30.0,
        ..SignalThresholds::default()
    };
    assert!(matches!(
        thresholds.validate(),
        Err(ConfigError::NoHysteresisGap { entry: "long", .. })
    ));

    let err = EngineConfig::from_lookup(lookup(&[("SHORT_EXIT", "70")])).unwrap_err();
    assert!(matches!(err, ConfigError::NoHysteresisGap { entry: "short", .. }));
}

#[test]
fn test_panic_must_sit_below_long_entry() {
    let thresholds = SignalThresholds {
        panic: 30.0,
        ..SignalThresholds::default()
    };
    assert!(matches!(
        thresholds.validate(),
        Err(ConfigError::PanicAboveEntry { .. })
    ));
}

#[test]
fn test_out_of_range_threshold() {
    let thresholds = SignalThresholds {
        short_entry: 120.0,
        ..SignalThresholds::default()
    };
    assert_eq!(
        thresholds.validate(),
        Err(ConfigError::ThresholdOutOfRange("short_entry"))
    );
}

#[test]
fn test_engine_bounds() {
    let base = EngineConfig::default();

    let small = EngineConfig {
        trend_window: 10,
        ..base.clone()
    };
    assert!(matches!(
        small.validate(),
        Err(ConfigError::TrendWindowTooSmall { min: 14, actual: 10 })
    ));

    let negative = EngineConfig {
        buffer_fraction: -0.01,
        ..base.clone()
    };
    assert!(matches!(negative.validate(), Err(ConfigError::InvalidBuffer(_))));

    let allocation = EngineConfig {
        allocation_fraction: 1.5,
        ..base
    };
    assert!(matches!(
        allocation.validate(),
        Err(ConfigError::InvalidAllocation(_))
    ));
}

#[test]
fn test_worker_bounds() {
    let no_interval = WorkerConfig {
        poll_interval_seconds: 0,
        ..WorkerConfig::default()
    };
    assert_eq!(no_interval.validate(), Err(ConfigError::ZeroPollInterval));

    let err = WorkerConfig::from_lookup(lookup(&[("SYMBOLS", " , ")])).unwrap_err();
    assert_eq!(err, ConfigError::NoSymbols);
}

#[test]
fn test_poll_interval_must_have_an_even_cadence() {
    for seconds in [1, 10, 30, 60, 300, 900, 3600] {
        let config = WorkerConfig {
            poll_interval_seconds: seconds,
            ..WorkerConfig::default()
        };
        assert_eq!(config.validate(), Ok(()), "{seconds}s should be accepted");
    }

    for seconds in [45, 90, 7200] {
        let config = WorkerConfig {
            poll_interval_seconds: seconds,
            ..WorkerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnevenPollInterval(seconds))
        );
    }

    let err = WorkerConfig::from_lookup(lookup(&[("POLL_INTERVAL_SECONDS", "45")])).unwrap_err();
    assert_eq!(err, ConfigError::UnevenPollInterval(45));
}

#[test]
fn test_candle_interval_is_checked() {
    let err = WorkerConfig::from_lookup(lookup(&[("CANDLE_INTERVAL", "15µ")])).unwrap_err();
    assert_eq!(err, ConfigError::UnsupportedCandleInterval("15µ".to_string()));

    let err = WorkerConfig::from_lookup(lookup(&[("CANDLE_INTERVAL", "15x")])).unwrap_err();
    assert_eq!(err, ConfigError::UnsupportedCandleInterval("15x".to_string()));

    let config = WorkerConfig::from_lookup(lookup(&[("CANDLE_INTERVAL", "4h")])).unwrap();
    assert_eq!(config.candle_interval, "4h");
}

#[test]
fn test_min_cash_must_be_finite_and_non_negative() {
    for bad in [f64::NAN, f64::INFINITY, -1.0] {
        let config = EngineConfig {
            min_cash: bad,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMinCash(_))
        ));
    }

    let err = EngineConfig::from_lookup(lookup(&[("MIN_CASH", "NaN")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMinCash(v) if v.is_nan()));

    let zero = EngineConfig {
        min_cash: 0.0,
        ..EngineConfig::default()
    };
    assert_eq!(zero.validate(), Ok(()));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: WorkerConfig =
        serde_json::from_str(r#"{"symbols":["EURUSD"],"engine":{"allow_short":true}}"#).unwrap();
    assert_eq!(config.symbols, vec!["EURUSD".to_string()]);
    assert!(config.engine.allow_short);
    assert_eq!(config.engine.trend_window, 200);
    assert_eq!(config.engine.thresholds.long_exit, 65.0);
}
