//! Lag polynomial utilities for ARMA models
//!
//! AR coefficients are taken in the convention `1 - φ1 B - ... - φp B^p` and
//! MA coefficients in `1 + θ1 B + ... + θq B^q`.

/// Product of two polynomials given by ascending coefficients.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// True when all roots of `1 - φ1 z - ... - φp z^p` lie outside the unit circle.
///
/// Uses the Levinson-Durbin step-down recursion: the polynomial is stationary
/// exactly when every implied partial autocorrelation is inside (-1, 1).
pub fn is_stationary(ar: &[f64]) -> bool {
    if ar.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut phi = ar.to_vec();
    while phi.last() == Some(&0.0) {
        phi.pop();
    }

    while let Some(&reflection) = phi.last() {
        if reflection.abs() >= 1.0 {
            return false;
        }
        let k = phi.len();
        let scale = 1.0 - reflection * reflection;
        phi = (0..k - 1)
            .map(|i| (phi[i] + reflection * phi[k - 2 - i]) / scale)
            .collect();
    }

    true
}

/// True when all roots of `1 + θ1 z + ... + θq z^q` lie outside the unit circle.
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|c| -c).collect();
    is_stationary(&negated)
}

/// The first `count` psi weights of an ARIMA(p, d, q) process.
///
/// These are the coefficients of the infinite moving-average representation
/// of `φ(B)(1 - B)^d y_t = θ(B) e_t`, with `ψ0 = 1`.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, count: usize) -> Vec<f64> {
    let mut operator: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|c| -c)).collect();
    for _ in 0..d {
        operator = multiply(&operator, &[1.0, -1.0]);
    }
    let full_ar: Vec<f64> = operator[1..].iter().map(|c| -c).collect();

    let mut psi: Vec<f64> = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut weight = ma.get(j - 1).copied().unwrap_or(0.0);
        for i in 1..=full_ar.len().min(j) {
            weight += full_ar[i - 1] * psi[j - i];
        }
        psi.push(weight);
    }
    psi
}
