//! The fetch, transform, fit and forecast stages wired together

use crate::data::{DerivedSeries, TimeSeries};
use crate::error::Result;
use crate::fetch::{SeriesSource, CPI_SERIES_ID};
use crate::forecast::{forecast_horizon, ForecastResult, Horizon, IntervalMode};
use crate::models::arima::FittedArima;
use crate::models::auto_arima::{AutoArima, AutoArimaConfig};
use crate::models::{FittedModel, ForecastModel};
use crate::present::{Figure, Layout};
use crate::transform::{
    derive, quarter_over_quarter, year_over_year, QUARTER_OVER_QUARTER_LAG, YEAR_OVER_YEAR_LAG,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameters of a full run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Series to fetch
    pub series_id: String,
    /// First date of the range, inclusive
    pub start: NaiveDate,
    /// Last date of the range, inclusive
    pub end: NaiveDate,
    /// Months to forecast
    #[serde(default)]
    pub horizon: Horizon,
    /// Whether forecasts carry confidence bounds
    #[serde(default)]
    pub interval: IntervalMode,
    /// Lags of the derived percent-change series, in display order
    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,
    /// Chart arrangement
    #[serde(default)]
    pub layout: Layout,
    /// Model search settings
    #[serde(default)]
    pub arima: AutoArimaConfig,
}

fn default_lags() -> Vec<usize> {
    vec![YEAR_OVER_YEAR_LAG, QUARTER_OVER_QUARTER_LAG]
}

impl PipelineConfig {
    /// CPI over `[start, end]` with default settings
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            series_id: CPI_SERIES_ID.to_string(),
            start,
            end,
            horizon: Horizon::default(),
            interval: IntervalMode::default(),
            lags: default_lags(),
            layout: Layout::default(),
            arima: AutoArimaConfig::default(),
        }
    }

    pub fn with_series_id(mut self, series_id: impl Into<String>) -> Self {
        self.series_id = series_id.into();
        self
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_interval(mut self, interval: IntervalMode) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_arima(mut self, arima: AutoArimaConfig) -> Self {
        self.arima = arima;
        self
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw: TimeSeries,
    pub derived: Vec<DerivedSeries>,
    pub model: FittedArima,
    pub forecast: ForecastResult,
}

impl PipelineOutput {
    /// Charts of this run in `layout`
    pub fn figure(&self, layout: Layout) -> Result<Figure> {
        Figure::compose(layout, &self.raw, &self.derived, &self.forecast)
    }
}

/// Runs the stages against a series source.
///
/// Stages can be called one at a time, which is how the interactive binary
/// asks for the horizon only after the model is fitted.
#[derive(Debug, Clone)]
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
}

impl<S: SeriesSource> Pipeline<S> {
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn fetch(&self) -> Result<TimeSeries> {
        self.source
            .fetch(&self.config.series_id, self.config.start, self.config.end)
    }

    /// Percent-change series for each configured lag
    pub fn transform(&self, raw: &TimeSeries) -> Result<Vec<DerivedSeries>> {
        self.config
            .lags
            .iter()
            .map(|&lag| match lag {
                YEAR_OVER_YEAR_LAG => year_over_year(raw),
                QUARTER_OVER_QUARTER_LAG => quarter_over_quarter(raw),
                _ => derive(raw, lag, format!("{}-Month Change (%)", lag)),
            })
            .collect()
    }

    pub fn fit(&self, raw: &TimeSeries) -> Result<FittedArima> {
        let model = AutoArima::new(self.config.arima.clone()).fit(raw)?;
        info!(
            model = %FittedModel::name(&model),
            aicc = model.criteria().aicc,
            "model selected"
        );
        Ok(model)
    }

    pub fn forecast(&self, model: &FittedArima, horizon: Horizon) -> Result<ForecastResult> {
        let result = forecast_horizon(model, horizon, self.config.interval)?;
        info!(horizon = result.horizon(), "forecast computed");
        Ok(result)
    }

    /// All stages with the configured horizon
    pub fn run(&self) -> Result<PipelineOutput> {
        let raw = self.fetch()?;
        let derived = self.transform(&raw)?;
        let model = self.fit(&raw)?;
        let forecast = self.forecast(&model, self.config.horizon)?;

        Ok(PipelineOutput {
            raw,
            derived,
            model,
            forecast,
        })
    }
}
