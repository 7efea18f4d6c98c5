//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{Candle, EmaIndicator, IndicatorSet, RsiIndicator};
pub use signal::{GuardState, InstrumentState, MarketRegime, PositionState, TradeAction};
