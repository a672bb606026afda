//! Error types for the cpi_forecast crate

use inflation_math::MathError;
use thiserror::Error;

/// Errors raised by the forecasting pipeline.
///
/// Every stage is strict: any of these aborts the rest of the pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series could not be fetched, or the requested range is invalid
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// No ARIMA candidate could be fitted to the series
    #[error("Model fit failed: {0}")]
    FitFailure(String),

    /// The forecast horizon was zero or negative
    #[error("Invalid forecast horizon {0}: the horizon must be at least 1 month")]
    InvalidHorizon(i64),

    /// Charts could not be drawn
    #[error("Render failed: {0}")]
    RenderFailure(String),

    /// User input or configuration could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from a numeric kernel
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
