//! Inflation-rate transforms of a raw price index

use crate::data::{DerivedSeries, TimeSeries};
use crate::error::{ForecastError, Result};
use inflation_math::change::percent_change;

/// Lag for year-over-year change on monthly data
pub const YEAR_OVER_YEAR_LAG: usize = 12;
/// Lag for quarter-over-quarter change on monthly data
pub const QUARTER_OVER_QUARTER_LAG: usize = 3;

/// Percentage change of `series` against the value `lag` periods earlier.
///
/// The result has the same length as the input; the first `lag` entries are
/// undefined. A lag of zero is rejected.
pub fn derive(series: &TimeSeries, lag: usize, label: impl Into<String>) -> Result<DerivedSeries> {
    if lag == 0 {
        return Err(ForecastError::InvalidInput(
            "Transform lag must be at least 1".to_string(),
        ));
    }
    let values = percent_change(series.values(), lag)?;
    Ok(DerivedSeries::new(label, lag, series.dates().to_vec(), values))
}

/// Year-over-year inflation rate in percent
pub fn year_over_year(series: &TimeSeries) -> Result<DerivedSeries> {
    derive(series, YEAR_OVER_YEAR_LAG, "YoY Inflation Rate (%)")
}

/// Quarter-over-quarter inflation rate in percent
pub fn quarter_over_quarter(series: &TimeSeries) -> Result<DerivedSeries> {
    derive(series, QUARTER_OVER_QUARTER_LAG, "QoQ Inflation Rate (%)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> TimeSeries {
        let dates = (1..=5)
            .map(|m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap())
            .collect();
        TimeSeries::new("CPI", dates, vec![100.0, 101.0, 102.0, 103.0, 104.0]).unwrap()
    }

    #[test]
    fn test_derive_alignment() {
        let derived = derive(&sample(), 3, "QoQ").unwrap();
        assert_eq!(derived.len(), 5);
        assert_eq!(derived.lag(), 3);
        assert_eq!(derived.dates(), sample().dates());
        assert_eq!(&derived.values()[..3], &[None, None, None]);
        assert!((derived.values()[3].unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_derive_rejects_zero_lag() {
        assert!(matches!(
            derive(&sample(), 0, "none"),
            Err(ForecastError::InvalidInput(_))
        ));
    }
}
