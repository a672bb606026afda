//! Forecasting models for monthly time series

use crate::data::TimeSeries;
use crate::error::Result;
use std::fmt::Debug;

/// A model fitted to a specific series
pub trait FittedModel: Debug {
    /// Point forecasts for the next `horizon` periods
    fn forecast_values(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Standard errors of the forecasts for the next `horizon` periods
    fn forecast_std_errors(&self, horizon: usize) -> Result<Vec<f64>>;

    /// The series the model was fitted to
    fn history(&self) -> &TimeSeries;

    /// Human-readable model name, including its order
    fn name(&self) -> String;
}

/// Forecast model that can be fitted to a time series
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to `series`
    fn fit(&self, series: &TimeSeries) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
pub mod auto_arima;
