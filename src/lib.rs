//! Trendgate: regime-filtered hysteresis signal engine.
//!
//! Price snapshot -> indicators -> regime -> signal -> guarded action.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
