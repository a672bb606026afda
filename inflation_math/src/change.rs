//! Period-over-period change calculations
//!
//! Contains:
//! - Percentage change over a fixed lag
//! - Ordinary differencing
//! - Integration (reverse differencing) of forecasts

use crate::{MathError, Result};

/// Percentage change of each value against the value `lag` periods earlier.
///
/// The output has the same length as `values`. The first `lag` entries are
/// `None` because there is no earlier value to compare against. A zero base
/// value yields the IEEE result of the division.
pub fn percent_change(values: &[f64], lag: usize) -> Result<Vec<Option<f64>>> {
    if lag == 0 {
        return Err(MathError::InvalidInput(
            "Lag must be at least 1 for a percentage change".to_string(),
        ));
    }

    let changes = values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if i < lag {
                None
            } else {
                let base = values[i - lag];
                Some((current - base) / base * 100.0)
            }
        })
        .collect();

    Ok(changes)
}

/// Apply ordinary differencing `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// `differenced` holds values on the `d`-times differenced scale that follow
/// the end of `original`. Each level is rebuilt by a cumulative sum anchored
/// at the last observation of the corresponding intermediate series.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Result<Vec<f64>> {
    if d == 0 {
        return Ok(differenced.to_vec());
    }
    if original.len() < d + 1 {
        return Err(MathError::InsufficientData(format!(
            "Integration of order {} needs at least {} observations, have {}",
            d,
            d + 1,
            original.len()
        )));
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level)
            .last()
            .copied()
            .ok_or_else(|| {
                MathError::CalculationError(format!("No anchor value at differencing level {}", level))
            })?;

        let mut running = anchor;
        result = result
            .iter()
            .map(|&step| {
                running += step;
                running
            })
            .collect();
    }

    Ok(result)
}
