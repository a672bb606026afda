//! # CPI Forecast
//!
//! Fetches the U.S. Consumer Price Index from FRED, derives year-over-year and
//! quarter-over-quarter inflation rates, fits an automatically selected ARIMA
//! model and charts the forecast in the terminal.
//!
//! ## Features
//!
//! - FRED graph CSV retrieval behind the [`fetch::SeriesSource`] trait
//! - Lagged percent-change transforms
//! - Stepwise ARIMA order selection by AICc, with KPSS-chosen differencing
//! - Month-start forecasts with optional normal confidence bounds
//! - Side-by-side or grid chart layouts drawn with ratatui
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use cpi_forecast::fetch::{InMemorySource, CPI_SERIES_ID};
//! use cpi_forecast::forecast::Horizon;
//! use cpi_forecast::pipeline::{Pipeline, PipelineConfig};
//! use cpi_forecast::TimeSeries;
//!
//! let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
//! let dates: Vec<NaiveDate> = (0..60)
//!     .map(|i| cpi_forecast::utils::add_months(start, i).unwrap())
//!     .collect();
//! let values = (0..60).map(|i| 234.0 + 0.25 * i as f64 + (i % 5) as f64 * 0.1).collect();
//! let cpi = TimeSeries::new(CPI_SERIES_ID, dates, values)?;
//!
//! let config = PipelineConfig::new(start, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap())
//!     .with_horizon(Horizon::new(6)?);
//! let output = Pipeline::new(InMemorySource::new(cpi), config).run()?;
//!
//! assert_eq!(output.forecast.horizon(), 6);
//! println!("{}", output.model);
//! # Ok::<(), cpi_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod present;
pub mod prompt;
pub mod transform;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DerivedSeries, Observation, TimeSeries};
pub use crate::error::ForecastError;
pub use crate::forecast::{forecast, ForecastResult, Horizon, IntervalMode};
pub use crate::models::arima::FittedArima;
pub use crate::models::auto_arima::{AutoArima, AutoArimaConfig};
pub use crate::models::{FittedModel, ForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
