//! Monthly time series types

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// An immutable series of observations with strictly increasing dates.
///
/// Monthly cadence is assumed by the downstream stages but not enforced, since
/// the provider may skip months it has no value for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    /// Series identifier or display name
    name: String,
    /// Observation dates
    dates: Vec<NaiveDate>,
    /// Observed values
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, validating lengths, ordering and values
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{}' has {} dates but {} values",
                name,
                dates.len(),
                values.len()
            )));
        }
        if dates.is_empty() {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{}' has no observations",
                name
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{}' dates are not strictly increasing at {} -> {}",
                name, pair[0], pair[1]
            )));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{}' has a non-finite value at {}",
                name, dates[position]
            )));
        }

        Ok(Self { name, dates, values })
    }

    /// Create a series from observations in date order
    pub fn from_observations(name: impl Into<String>, observations: &[Observation]) -> Result<Self> {
        let (dates, values) = observations.iter().map(|o| (o.date, o.value)).unzip();
        Self::new(name, dates, values)
    }

    /// Series name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Date of the first observation
    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Date of the last observation
    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Value of the last observation
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Iterate observations in date order
    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .map(|(&date, &value)| Observation { date, value })
    }

    /// The last `count` observations (or all of them if shorter)
    pub fn tail(&self, count: usize) -> Self {
        let start = self.len().saturating_sub(count.max(1));
        Self {
            name: self.name.clone(),
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }
}

/// A series derived from a [`TimeSeries`] by a lagged transform.
///
/// Aligned to the source dates; entries without enough history are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    /// Display label, e.g. "YoY Inflation Rate (%)"
    label: String,
    /// Lag in periods
    lag: usize,
    /// Dates shared with the source series
    dates: Vec<NaiveDate>,
    /// Derived values
    values: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub(crate) fn new(
        label: impl Into<String>,
        lag: usize,
        dates: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            label: label.into(),
            lag,
            dates,
            values,
        }
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lag in periods
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Dates shared with the source series
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Derived values, `None` where undefined
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of entries, defined or not
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the defined entries as observations
    pub fn defined(&self) -> impl Iterator<Item = Observation> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter_map(|(&date, value)| value.map(|value| Observation { date, value }))
    }

    /// Number of defined entries
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
