//! Descriptive statistics over slices

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty series".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by n)
pub fn variance(values: &[f64]) -> Result<f64> {
    let mean = mean(values)?;
    Ok(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Sum of products of the series with itself shifted by `lag`, divided by n.
///
/// The caller is expected to pass an already demeaned series.
pub fn autocovariance(values: &[f64], lag: usize) -> f64 {
    if values.is_empty() || lag >= values.len() {
        return 0.0;
    }
    let sum: f64 = values[lag..]
        .iter()
        .zip(values.iter())
        .map(|(a, b)| a * b)
        .sum();
    sum / values.len() as f64
}

/// True when every value equals the first one within a relative tolerance.
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        None => true,
        Some(&first) => {
            let scale = first.abs().max(1.0);
            values.iter().all(|v| (v - first).abs() <= 1e-12 * scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(variance(&values).unwrap(), 4.0);
    }

    #[test]
    fn test_mean_empty() {
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn test_autocovariance_lag_zero_is_mean_square() {
        let values = vec![1.0, -1.0, 1.0, -1.0];
        assert_relative_eq!(autocovariance(&values, 0), 1.0);
        assert_relative_eq!(autocovariance(&values, 1), -0.75);
        assert_eq!(autocovariance(&values, 10), 0.0);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[3.0, 3.0, 3.0]));
        assert!(!is_constant(&[3.0, 3.0, 3.1]));
        assert!(is_constant(&[]));
    }
}
