//! Indicator calculation errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient history: need at least {required} closes, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("non-finite close at index {index}")]
    InvalidPrice { index: usize },
}
