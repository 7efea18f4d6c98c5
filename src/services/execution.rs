//! Order execution interface, entry sizing and an in-memory paper executor

use crate::models::signal::{PositionState, TradeAction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("order rejected for {symbol}: {reason}")]
    Rejected { symbol: String, reason: String },

    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A market order forwarded to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub action: TradeAction,
    pub side: OrderSide,
    pub quantity: f64,
    /// Reference price at decision time.
    pub price: f64,
}

impl OrderRequest {
    /// Build the order for a non-HOLD action. `None` for HOLD.
    pub fn for_action(symbol: &str, action: TradeAction, quantity: f64, price: f64) -> Option<Self> {
        let side = match action {
            TradeAction::EnterLong | TradeAction::ExitShort => OrderSide::Buy,
            TradeAction::EnterShort | TradeAction::ExitLong => OrderSide::Sell,
            TradeAction::Hold => return None,
        };
        Some(Self {
            symbol: symbol.to_string(),
            action,
            side,
            quantity,
            price,
        })
    }

    /// Quantity with sign: positive buys, negative sells.
    pub fn signed_quantity(&self) -> f64 {
        match self.side {
            OrderSide::Buy => self.quantity,
            OrderSide::Sell => -self.quantity,
        }
    }
}

/// Why an entry was not sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingRejection {
    InsufficientCash { cash: f64, min_cash: f64 },
    ZeroQuantity,
}

/// Fixed-fraction entry sizing.
///
/// Commits `allocation * cash`. Symbols quoted against USD as the base
/// ("USDJPY") size in base units directly, everything else divides by price.
pub fn size_entry(
    symbol: &str,
    cash: f64,
    price: f64,
    allocation: f64,
    min_cash: f64,
) -> Result<f64, SizingRejection> {
    if cash < min_cash {
        return Err(SizingRejection::InsufficientCash { cash, min_cash });
    }

    let spendable = cash * allocation;
    let quantity = if symbol.starts_with("USD") {
        spendable.floor()
    } else if price > 0.0 {
        (spendable / price).floor()
    } else {
        0.0
    };

    if quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(SizingRejection::ZeroQuantity)
    }
}

#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> Result<(), ExecutionError>;

    /// Whether an unfilled order is still working for `symbol`.
    async fn has_open_order(&self, symbol: &str) -> Result<bool, ExecutionError>;

    /// Signed quantity held for `symbol`.
    async fn position_quantity(&self, symbol: &str) -> Result<f64, ExecutionError>;

    async fn cash_balance(&self) -> Result<f64, ExecutionError>;

    async fn position(&self, symbol: &str) -> Result<PositionState, ExecutionError> {
        Ok(PositionState::from_quantity(
            self.position_quantity(symbol).await?,
        ))
    }
}

#[derive(Debug, Default)]
struct PaperBook {
    cash: f64,
    positions: HashMap<String, f64>,
    fills: Vec<OrderRequest>,
}

/// Fills every order immediately at its reference price.
pub struct PaperExecutor {
    book: RwLock<PaperBook>,
}

impl PaperExecutor {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            book: RwLock::new(PaperBook {
                cash: starting_cash,
                ..PaperBook::default()
            }),
        }
    }

    /// Orders filled so far, oldest first.
    pub async fn fills(&self) -> Vec<OrderRequest> {
        self.book.read().await.fills.clone()
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn submit(&self, order: &OrderRequest) -> Result<(), ExecutionError> {
        if !(order.quantity > 0.0) {
            return Err(ExecutionError::Rejected {
                symbol: order.symbol.clone(),
                reason: format!("non-positive quantity {}", order.quantity),
            });
        }

        let mut book = self.book.write().await;
        let signed = order.signed_quantity();
        book.cash -= signed * order.price;
        let held = book.positions.entry(order.symbol.clone()).or_insert(0.0);
        *held += signed;
        if *held == 0.0 {
            book.positions.remove(&order.symbol);
        }
        book.fills.push(order.clone());

        info!(
            symbol = %order.symbol,
            action = %order.action,
            quantity = order.quantity,
            price = order.price,
            "PaperExecutor: filled {} {} @ {}",
            order.action,
            order.quantity,
            order.price
        );
        Ok(())
    }

    async fn has_open_order(&self, _symbol: &str) -> Result<bool, ExecutionError> {
        Ok(false)
    }

    async fn position_quantity(&self, symbol: &str) -> Result<f64, ExecutionError> {
        Ok(self
            .book
            .read()
            .await
            .positions
            .get(symbol)
            .copied()
            .unwrap_or(0.0))
    }

    async fn cash_balance(&self) -> Result<f64, ExecutionError> {
        Ok(self.book.read().await.cash)
    }
}
