//! Derivative-free minimization
//!
//! Nelder-Mead simplex search. Objectives may return `f64::INFINITY` to mark
//! infeasible points; the simplex then moves away from them.

/// Configuration for Nelder-Mead optimization
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Step used to build the initial simplex around a zero coordinate
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-10,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

/// Result of a Nelder-Mead run
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was met before `max_iter`
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`.
///
/// # Example
/// ```
/// use inflation_math::optimize::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &NelderMeadConfig::default(),
/// );
/// assert!((result.point[0] - 2.0).abs() < 1e-3);
/// assert!((result.point[1] - 3.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            point: Vec::new(),
            value: objective(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        sort_simplex(&mut simplex, &mut values);

        let best = values[0];
        let worst = values[n];
        if best.is_finite() && worst - best <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }

        let centroid = centroid(&simplex[..n]);
        let reflected = along(&centroid, &simplex[n], -config.alpha);
        let reflected_value = objective(&reflected);

        if reflected_value < best {
            let expanded = along(&centroid, &reflected, config.gamma);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < worst {
            let point = along(&centroid, &reflected, config.rho);
            let value = objective(&point);
            (point, value)
        } else {
            let point = along(&centroid, &simplex[n], config.rho);
            let value = objective(&point);
            (point, value)
        };

        if contracted_value < reflected_value.min(worst) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        let anchor = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = along(&anchor, &simplex[i], config.sigma);
            values[i] = objective(&simplex[i]);
        }
    }

    sort_simplex(&mut simplex, &mut values);
    NelderMeadResult {
        point: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    }
}

fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn centroid(vertices: &[Vec<f64>]) -> Vec<f64> {
    let dim = vertices[0].len();
    let count = vertices.len() as f64;
    (0..dim)
        .map(|j| vertices.iter().map(|v| v[j]).sum::<f64>() / count)
        .collect()
}

/// `origin + factor * (target - origin)`
fn along(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}
