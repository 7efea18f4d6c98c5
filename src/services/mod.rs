//! External collaborators: market data and order execution.

pub mod execution;
pub mod hyperliquid;
pub mod market_data;
