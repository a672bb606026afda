//! Projection of a fitted model over a monthly horizon

use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use crate::utils::future_month_starts;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Default confidence level of forecast bounds
pub const DEFAULT_LEVEL: f64 = 0.95;

/// Horizon used when none is given
pub const DEFAULT_HORIZON_MONTHS: usize = 12;

/// Number of months to forecast, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Horizon(NonZeroUsize);

impl Horizon {
    /// Validate a horizon; zero and negative values are rejected
    pub fn new(months: i64) -> Result<Self> {
        usize::try_from(months)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(ForecastError::InvalidHorizon(months))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_HORIZON_MONTHS - 1))
    }
}

impl TryFrom<i64> for Horizon {
    type Error = ForecastError;

    fn try_from(months: i64) -> Result<Self> {
        Self::new(months)
    }
}

impl From<Horizon> for i64 {
    fn from(horizon: Horizon) -> i64 {
        i64::try_from(horizon.get()).unwrap_or(i64::MAX)
    }
}

impl FromStr for Horizon {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let months: i64 = trimmed.parse().map_err(|_| {
            ForecastError::InvalidInput(format!(
                "'{}' is not a whole number of months",
                trimmed
            ))
        })?;
        Self::new(months)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether forecasts carry confidence bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntervalMode {
    PointOnly,
    /// Bounds at confidence `level`, strictly between 0 and 1
    WithBounds { level: f64 },
}

impl Default for IntervalMode {
    fn default() -> Self {
        Self::WithBounds {
            level: DEFAULT_LEVEL,
        }
    }
}

/// Forecast value for one future month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Confidence bounds for one future month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Forecast over a horizon, with or without confidence bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForecastResult {
    PointOnly {
        points: Vec<ForecastPoint>,
    },
    PointWithBounds {
        points: Vec<ForecastPoint>,
        bounds: Vec<ForecastBounds>,
        level: f64,
    },
}

impl ForecastResult {
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            Self::PointOnly { points } | Self::PointWithBounds { points, .. } => points,
        }
    }

    /// Bounds aligned with [`points`](Self::points), if computed
    pub fn bounds(&self) -> Option<&[ForecastBounds]> {
        match self {
            Self::PointOnly { .. } => None,
            Self::PointWithBounds { bounds, .. } => Some(bounds),
        }
    }

    /// Confidence level of the bounds, if computed
    pub fn level(&self) -> Option<f64> {
        match self {
            Self::PointOnly { .. } => None,
            Self::PointWithBounds { level, .. } => Some(*level),
        }
    }

    /// Number of forecast months
    pub fn horizon(&self) -> usize {
        self.points().len()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points().iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points().iter().map(|p| p.value).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points().last().map(|p| p.date)
    }
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointOnly { points } => {
                writeln!(f, "{:<10} {:>10}", "Month", "Forecast")?;
                for point in points {
                    writeln!(f, "{:<10} {:>10.3}", point.date.format("%b %Y"), point.value)?;
                }
            }
            Self::PointWithBounds {
                points,
                bounds,
                level,
            } => {
                let pct = level * 100.0;
                writeln!(
                    f,
                    "{:<10} {:>10} {:>10} {:>10}",
                    "Month",
                    "Forecast",
                    format!("Lo {:.0}", pct),
                    format!("Hi {:.0}", pct)
                )?;
                for (point, bound) in points.iter().zip(bounds) {
                    writeln!(
                        f,
                        "{:<10} {:>10.3} {:>10.3} {:>10.3}",
                        point.date.format("%b %Y"),
                        point.value,
                        bound.lower,
                        bound.upper
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Two-sided standard normal quantile for confidence `level`
fn z_score(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidInput(format!(
            "Confidence level {} must be strictly between 0 and 1",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidInput(format!("Normal distribution: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

/// Forecast `horizon` months past the end of the model's history.
///
/// Dates are the month starts following the last observed date. Fails with
/// [`ForecastError::InvalidHorizon`] for a horizon below one.
pub fn forecast<M: FittedModel + ?Sized>(
    model: &M,
    horizon: i64,
    mode: IntervalMode,
) -> Result<ForecastResult> {
    let horizon = Horizon::new(horizon)?;
    forecast_horizon(model, horizon, mode)
}

/// Forecast over an already validated horizon
pub fn forecast_horizon<M: FittedModel + ?Sized>(
    model: &M,
    horizon: Horizon,
    mode: IntervalMode,
) -> Result<ForecastResult> {
    let steps = horizon.get();
    let dates = future_month_starts(model.history().last_date(), steps)?;
    let values = model.forecast_values(steps)?;
    if values.len() != steps {
        return Err(ForecastError::FitFailure(format!(
            "{} produced {} forecasts for a horizon of {}",
            model.name(),
            values.len(),
            steps
        )));
    }

    let points: Vec<ForecastPoint> = dates
        .into_iter()
        .zip(values)
        .map(|(date, value)| ForecastPoint { date, value })
        .collect();

    match mode {
        IntervalMode::PointOnly => Ok(ForecastResult::PointOnly { points }),
        IntervalMode::WithBounds { level } => {
            let z = z_score(level)?;
            let bounds = model
                .forecast_std_errors(steps)?
                .into_iter()
                .zip(&points)
                .map(|(se, point)| ForecastBounds {
                    lower: point.value - z * se,
                    upper: point.value + z * se,
                })
                .collect();
            Ok(ForecastResult::PointWithBounds {
                points,
                bounds,
                level,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimeSeries;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Random walk stand-in with unit innovations
    #[derive(Debug)]
    struct Flat {
        history: TimeSeries,
    }

    impl FittedModel for Flat {
        fn forecast_values(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok(vec![self.history.last_value(); horizon])
        }

        fn forecast_std_errors(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok((1..=horizon).map(|h| (h as f64).sqrt()).collect())
        }

        fn history(&self) -> &TimeSeries {
            &self.history
        }

        fn name(&self) -> String {
            "flat".to_string()
        }
    }

    fn flat() -> Flat {
        let dates = vec![
            NaiveDate::from_ymd_opt(2019, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 12, 1).unwrap(),
        ];
        Flat {
            history: TimeSeries::new("CPI", dates, vec![257.0, 258.0]).unwrap(),
        }
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(-24)]
    fn test_invalid_horizon(#[case] horizon: i64) {
        assert!(matches!(
            forecast(&flat(), horizon, IntervalMode::default()),
            Err(ForecastError::InvalidHorizon(h)) if h == horizon
        ));
    }

    #[test]
    fn test_horizon_parsing() {
        assert_eq!("12".parse::<Horizon>().unwrap().get(), 12);
        assert_eq!(Horizon::default().get(), DEFAULT_HORIZON_MONTHS);
        assert_eq!(" 3\n".parse::<Horizon>().unwrap().get(), 3);
        assert!(matches!(
            "0".parse::<Horizon>(),
            Err(ForecastError::InvalidHorizon(0))
        ));
        assert!(matches!(
            "six".parse::<Horizon>(),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_point_only() {
        let result = forecast(&flat(), 3, IntervalMode::PointOnly).unwrap();
        assert_eq!(result.horizon(), 3);
        assert!(result.bounds().is_none());
        assert_eq!(
            result.dates(),
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_bounds_use_normal_quantile() {
        let result = forecast(&flat(), 4, IntervalMode::default()).unwrap();
        let bounds = result.bounds().unwrap();
        assert_eq!(result.level(), Some(0.95));
        assert_eq!(bounds.len(), 4);

        assert_relative_eq!(bounds[0].upper - 258.0, 1.959964, epsilon = 1e-5);
        assert_relative_eq!(bounds[3].upper - bounds[3].lower, 4.0 * 1.959964, epsilon = 1e-4);
        for (point, bound) in result.points().iter().zip(bounds) {
            assert!(bound.lower <= point.value && point.value <= bound.upper);
        }
    }

    #[test]
    fn test_invalid_level() {
        assert!(matches!(
            forecast(&flat(), 2, IntervalMode::WithBounds { level: 1.0 }),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_display_table() {
        let table = forecast(&flat(), 2, IntervalMode::default())
            .unwrap()
            .to_string();
        assert!(table.starts_with("Month"));
        assert!(table.contains("Lo 95"));
        assert!(table.contains("Jan 2020"));
        assert!(table.contains("Feb 2020"));
    }
}
