//! Stationarity testing
//!
//! Implements the KPSS test for level stationarity and the differencing
//! order search built on it.

use crate::change::difference;
use crate::stats::{autocovariance, is_constant, mean};
use crate::{MathError, Result};

/// Outcome of a KPSS level-stationarity test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpssOutcome {
    /// Test statistic
    pub statistic: f64,
    /// Critical value at the requested significance level
    pub critical_value: f64,
    /// Newey-West bandwidth used for the long-run variance
    pub lags: usize,
}

impl KpssOutcome {
    /// True when the null hypothesis of stationarity is rejected
    pub fn rejects_stationarity(&self) -> bool {
        self.statistic > self.critical_value
    }
}

/// Critical values of the KPSS level test (Kwiatkowski et al., 1992, table 1)
pub fn kpss_critical_value(alpha: f64) -> Result<f64> {
    const TABLE: [(f64, f64); 4] = [(0.10, 0.347), (0.05, 0.463), (0.025, 0.574), (0.01, 0.739)];

    TABLE
        .iter()
        .find(|(level, _)| (level - alpha).abs() < 1e-12)
        .map(|&(_, critical)| critical)
        .ok_or_else(|| {
            MathError::InvalidInput(format!(
                "Unsupported KPSS significance level {}; use 0.10, 0.05, 0.025 or 0.01",
                alpha
            ))
        })
}

/// Run the KPSS test for level stationarity.
///
/// The bandwidth follows the short rule `trunc(3 * sqrt(n) / 13)`.
pub fn kpss_test(values: &[f64], alpha: f64) -> Result<KpssOutcome> {
    let n = values.len();
    if n < 3 {
        return Err(MathError::InsufficientData(format!(
            "KPSS test needs at least 3 observations, have {}",
            n
        )));
    }
    let critical_value = kpss_critical_value(alpha)?;

    let level = mean(values)?;
    let residuals: Vec<f64> = values.iter().map(|v| v - level).collect();

    let mut partial = 0.0;
    let eta: f64 = residuals
        .iter()
        .map(|e| {
            partial += e;
            partial * partial
        })
        .sum::<f64>()
        / (n as f64).powi(2);

    let lags = (3.0 * (n as f64).sqrt() / 13.0).trunc() as usize;
    let long_run_variance = autocovariance(&residuals, 0)
        + 2.0
            * (1..=lags)
                .map(|s| (1.0 - s as f64 / (lags as f64 + 1.0)) * autocovariance(&residuals, s))
                .sum::<f64>();

    if long_run_variance <= 0.0 || !long_run_variance.is_finite() {
        return Err(MathError::CalculationError(
            "Long-run variance is not positive; the series is degenerate".to_string(),
        ));
    }

    Ok(KpssOutcome {
        statistic: eta / long_run_variance,
        critical_value,
        lags,
    })
}

/// Number of ordinary differences needed to make the series level stationary.
///
/// Differencing stops when the KPSS test no longer rejects stationarity, when
/// the differenced series becomes constant, or when `max_d` is reached.
pub fn ndiffs(values: &[f64], alpha: f64, max_d: usize) -> Result<usize> {
    kpss_critical_value(alpha)?;
    if is_constant(values) {
        return Ok(0);
    }

    let mut current = values.to_vec();
    let mut d = 0;
    while d < max_d && current.len() >= 3 {
        if !kpss_test(&current, alpha)?.rejects_stationarity() {
            break;
        }
        current = difference(&current, 1);
        d += 1;
        if is_constant(&current) {
            break;
        }
    }

    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cyclic(n: usize) -> Vec<f64> {
        [1.0, 0.0, -1.0, 0.0].iter().cycle().take(n).copied().collect()
    }

    #[test]
    fn test_kpss_accepts_stationary_cycle() {
        let outcome = kpss_test(&cyclic(100), 0.05).unwrap();
        assert_eq!(outcome.lags, 2);
        assert!(outcome.statistic < 0.1);
        assert!(!outcome.rejects_stationarity());
    }

    #[test]
    fn test_kpss_rejects_trend() {
        let trend: Vec<f64> = (0..50).map(|i| i as f64 + (i as f64 * 0.7).sin()).collect();
        let outcome = kpss_test(&trend, 0.05).unwrap();
        assert!(outcome.rejects_stationarity());
    }

    #[test]
    fn test_kpss_unsupported_alpha() {
        assert!(matches!(
            kpss_test(&cyclic(20), 0.2),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ndiffs() {
        assert_eq!(ndiffs(&cyclic(100), 0.05, 2).unwrap(), 0);

        let linear: Vec<f64> = (0..50).map(|i| 3.0 + 2.0 * i as f64).collect();
        assert_eq!(ndiffs(&linear, 0.05, 2).unwrap(), 1);

        assert_eq!(ndiffs(&[4.0; 30], 0.05, 2).unwrap(), 0);
    }

    #[test]
    fn test_ndiffs_respects_max_d() {
        let quadratic: Vec<f64> = (0..60).map(|i| (i * i) as f64).collect();
        assert!(ndiffs(&quadratic, 0.05, 1).unwrap() <= 1);
    }
}
