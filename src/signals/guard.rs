//! In-flight order guard, one flag per instrument

use crate::models::signal::GuardState;
use std::collections::HashMap;
use tracing::debug;

/// Tracks which instruments have an order outstanding.
///
/// Unknown instruments are clear.
#[derive(Debug, Default, Clone)]
pub struct OrderGuard {
    flags: HashMap<String, GuardState>,
}

impl OrderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, symbol: &str) -> GuardState {
        self.flags.get(symbol).copied().unwrap_or_default()
    }

    pub fn is_guarded(&self, symbol: &str) -> bool {
        self.state(symbol) == GuardState::Pending
    }

    /// Mark an order as in flight for `symbol`.
    pub fn set_guard(&mut self, symbol: &str) {
        debug!(symbol = %symbol, "OrderGuard: set");
        self.flags.insert(symbol.to_string(), GuardState::Pending);
    }

    /// Call only once the broker reports no open order for `symbol`.
    pub fn clear_guard(&mut self, symbol: &str) {
        if self.flags.remove(symbol).is_some() {
            debug!(symbol = %symbol, "OrderGuard: cleared");
        }
    }

    /// Symbols currently guarded.
    pub fn pending(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .flags
            .iter()
            .filter(|(_, state)| **state == GuardState::Pending)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }
}
