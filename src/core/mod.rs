//! Core application primitives: decision cycle and poll scheduling

pub mod cycle;
pub mod scheduler;

pub use cycle::*;
pub use scheduler::*;
