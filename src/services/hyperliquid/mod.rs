//! Hyperliquid REST market data

pub mod rest;

pub use rest::*;
