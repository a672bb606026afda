//! # CPI ARIMA Workspace
//!
//! Umbrella crate for the workspace. It re-exports the two member crates:
//!
//! - [`inflation_math`]: numeric kernels (percent change, differencing, KPSS,
//!   lag polynomials, Nelder-Mead)
//! - [`cpi_forecast`]: fetching, transforms, ARIMA selection, forecasting and
//!   terminal charts
//!
//! ## Example
//!
//! ```
//! use cpi_arima_workspace::prelude::*;
//!
//! let horizon: Horizon = "6".parse().unwrap();
//! assert_eq!(horizon.get(), 6);
//! assert!(Horizon::new(0).is_err());
//! ```

pub use cpi_forecast;
pub use inflation_math;

/// The types most programs need
pub mod prelude {
    pub use cpi_forecast::fetch::{FredClient, InMemorySource, SeriesSource, CPI_SERIES_ID};
    pub use cpi_forecast::pipeline::{Pipeline, PipelineConfig, PipelineOutput};
    pub use cpi_forecast::present::{Figure, Layout};
    pub use cpi_forecast::{
        forecast, AutoArima, AutoArimaConfig, DerivedSeries, FittedArima, FittedModel,
        ForecastError, ForecastModel, ForecastResult, Horizon, IntervalMode, TimeSeries,
    };
    pub use inflation_math::MathError;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use chrono::NaiveDate;

    #[test]
    fn test_prelude_covers_a_run() {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..36)
            .map(|i| cpi_forecast::utils::add_months(start, i).unwrap())
            .collect();
        let values = (0..36)
            .map(|i| 247.0 + 0.3 * i as f64 + if i % 2 == 0 { 0.2 } else { -0.2 })
            .collect();
        let cpi = TimeSeries::new(CPI_SERIES_ID, dates, values).unwrap();

        let end = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        let config = PipelineConfig::new(start, end).with_horizon(Horizon::new(3).unwrap());
        let output = Pipeline::new(InMemorySource::new(cpi), config).run().unwrap();

        assert_eq!(output.forecast.horizon(), 3);
        assert!(output.figure(Layout::SideBySide).is_ok());
    }

    #[test]
    fn test_math_errors_convert() {
        let err: ForecastError = MathError::CalculationError("boom".to_string()).into();
        assert!(matches!(err, ForecastError::Math(_)));
    }
}
