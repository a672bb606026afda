//! Retrieval of economic series
//!
//! [`FredClient`] reads the public FRED graph CSV export, which needs no API
//! key. [`InMemorySource`] serves an already loaded series and is what tests
//! and offline runs use.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::DATE_FORMAT;
use chrono::NaiveDate;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

/// FRED identifier of the Consumer Price Index for All Urban Consumers
pub const CPI_SERIES_ID: &str = "CPIAUCSL";

/// FRED graph CSV export endpoint
pub const FRED_GRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// Marker FRED uses for a missing observation
const MISSING_VALUE: &str = ".";

/// A provider of named time series
pub trait SeriesSource {
    /// Fetch `series_id` restricted to the inclusive range `[start, end]`
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries>;
}

/// Reject empty or inverted date ranges before any work is done
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start >= end {
        return Err(ForecastError::DataUnavailable(format!(
            "Start date {} must be before end date {}",
            start, end
        )));
    }
    Ok(())
}

/// Parse a FRED graph CSV export into a series restricted to `[start, end]`.
///
/// The first column holds the observation date and the second column must be
/// headed by `series_id`. Missing observations are skipped.
pub fn parse_fred_csv<R: Read>(
    reader: R,
    series_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TimeSeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ForecastError::DataUnavailable(format!("Malformed FRED response: {}", e)))?;
    match headers.get(1) {
        Some(column) if column.eq_ignore_ascii_case(series_id) => {}
        other => {
            return Err(ForecastError::DataUnavailable(format!(
                "Expected a '{}' column in the FRED response, found {:?}",
                series_id, other
            )))
        }
    }

    let mut dates = Vec::new();
    let mut values = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.records() {
        let record = record
            .map_err(|e| ForecastError::DataUnavailable(format!("Malformed FRED row: {}", e)))?;
        let (Some(date_field), Some(value_field)) = (record.get(0), record.get(1)) else {
            return Err(ForecastError::DataUnavailable(format!(
                "FRED row has too few columns: {:?}",
                record
            )));
        };

        let date = NaiveDate::parse_from_str(date_field, DATE_FORMAT).map_err(|e| {
            ForecastError::DataUnavailable(format!("Bad observation date '{}': {}", date_field, e))
        })?;
        if date < start || date > end {
            continue;
        }
        if value_field.is_empty() || value_field == MISSING_VALUE {
            skipped += 1;
            continue;
        }
        let value: f64 = value_field.parse().map_err(|e| {
            ForecastError::DataUnavailable(format!(
                "Bad value '{}' for {}: {}",
                value_field, date_field, e
            ))
        })?;

        dates.push(date);
        values.push(value);
    }

    if skipped > 0 {
        debug!(series_id, skipped, "skipped missing observations");
    }
    if dates.is_empty() {
        return Err(ForecastError::DataUnavailable(format!(
            "No observations of {} between {} and {}",
            series_id, start, end
        )));
    }

    TimeSeries::new(series_id, dates, values)
        .map_err(|e| ForecastError::DataUnavailable(format!("Inconsistent FRED data: {}", e)))
}

/// Blocking client for the FRED graph CSV export
#[derive(Debug, Clone)]
pub struct FredClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl FredClient {
    /// Create a client for the public FRED endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(FRED_GRAPH_URL)
    }

    /// Create a client for a different export URL, e.g. a mirror
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("cpi_forecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ForecastError::DataUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Export URL used by this client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SeriesSource for FredClient {
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        validate_range(start, end)?;

        let start_param = start.format(DATE_FORMAT).to_string();
        let end_param = end.format(DATE_FORMAT).to_string();
        debug!(series_id, %start, %end, url = %self.base_url, "fetching series from FRED");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("id", series_id),
                ("cosd", start_param.as_str()),
                ("coed", end_param.as_str()),
            ])
            .send()
            .map_err(|e| ForecastError::DataUnavailable(format!("FRED request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::DataUnavailable(format!(
                "FRED returned HTTP {} for {}",
                status, series_id
            )));
        }

        let body = response.bytes().map_err(|e| {
            ForecastError::DataUnavailable(format!("Failed to read FRED response: {}", e))
        })?;
        let series = parse_fred_csv(body.as_ref(), series_id, start, end)?;

        info!(
            series_id,
            observations = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            "fetched series"
        );
        Ok(series)
    }
}

/// Serves a preloaded series, filtered to the requested range
#[derive(Debug, Clone)]
pub struct InMemorySource {
    series: TimeSeries,
}

impl InMemorySource {
    pub fn new(series: TimeSeries) -> Self {
        Self { series }
    }
}

impl SeriesSource for InMemorySource {
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        validate_range(start, end)?;
        if series_id != self.series.name() {
            return Err(ForecastError::DataUnavailable(format!(
                "Series {} is not available; this source holds {}",
                series_id,
                self.series.name()
            )));
        }

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = self
            .series
            .observations()
            .filter(|o| o.date >= start && o.date <= end)
            .map(|o| (o.date, o.value))
            .unzip();

        if dates.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "No observations of {} between {} and {}",
                series_id, start, end
            )));
        }

        TimeSeries::new(series_id, dates, values)
    }
}
