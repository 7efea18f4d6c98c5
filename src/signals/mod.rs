//! Regime classification, the hysteresis state machine and the order guard.

pub mod engine;
pub mod guard;
pub mod regime;

pub use engine::*;
pub use guard::*;
pub use regime::*;
