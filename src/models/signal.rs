//! Regime, position and action types exchanged between the engine layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse trend classification of price against the trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketRegime {
    Bull,
    Bear,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Bull => write!(f, "BULL"),
            MarketRegime::Bear => write!(f, "BEAR"),
        }
    }
}

/// What is currently held for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionState {
    /// Derive the state from a signed quantity.
    pub fn from_quantity(quantity: f64) -> Self {
        if quantity > 0.0 {
            PositionState::Long
        } else if quantity < 0.0 {
            PositionState::Short
        } else {
            PositionState::Flat
        }
    }
}

/// In-flight order flag for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GuardState {
    Pending,
    #[default]
    Clear,
}

/// The engine's single output per instrument per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
    Hold,
}

impl TradeAction {
    pub fn is_hold(&self) -> bool {
        matches!(self, TradeAction::Hold)
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, TradeAction::EnterLong | TradeAction::EnterShort)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeAction::EnterLong => "ENTER_LONG",
            TradeAction::EnterShort => "ENTER_SHORT",
            TradeAction::ExitLong => "EXIT_LONG",
            TradeAction::ExitShort => "EXIT_SHORT",
            TradeAction::Hold => "HOLD",
        };
        f.write_str(label)
    }
}

/// Per-instrument record owned by the driver and threaded through each
/// evaluation. `last_regime` is only used to report regime changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentState {
    pub symbol: String,
    pub position: PositionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_regime: Option<MarketRegime>,
}

impl InstrumentState {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: PositionState::Flat,
            last_regime: None,
        }
    }

    pub fn with_position(mut self, position: PositionState) -> Self {
        self.position = position;
        self
    }
}
