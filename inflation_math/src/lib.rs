//! # Inflation Math
//!
//! Numeric building blocks for inflation analysis and ARIMA estimation.
//! Everything in this crate works on plain `f64` slices and has no I/O.
//!
//! - [`change`]: percentage change, differencing and integration
//! - [`stats`]: descriptive statistics
//! - [`stationarity`]: the KPSS test and differencing order selection
//! - [`polynomial`]: lag polynomial checks and psi weights
//! - [`optimize`]: Nelder-Mead minimization

use thiserror::Error;

pub mod change;
pub mod optimize;
pub mod polynomial;
pub mod stationarity;
pub mod stats;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
