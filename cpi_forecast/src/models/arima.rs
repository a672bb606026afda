//! Fixed-order ARIMA estimation by conditional sum of squares

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::auto_arima::SearchReport;
use crate::models::{FittedModel, ForecastModel};
use inflation_math::change::{difference, integrate};
use inflation_math::optimize::{nelder_mead, NelderMeadConfig};
use inflation_math::polynomial::{is_invertible, is_stationary, psi_weights};
use inflation_math::stats::mean;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Non-seasonal ARIMA order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Criterion used to rank candidate models; lower is better
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    /// Small-sample corrected AIC
    #[default]
    Aicc,
    Bic,
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aic => "AIC",
            Self::Aicc => "AICc",
            Self::Bic => "BIC",
        };
        f.write_str(label)
    }
}

/// Goodness-of-fit measures of an estimated model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Criteria {
    pub log_likelihood: f64,
    pub aic: f64,
    /// Infinite when there are too few observations for the correction
    pub aicc: f64,
    pub bic: f64,
}

impl Criteria {
    /// Criteria for a Gaussian likelihood with `k` estimated parameters
    /// (including the innovation variance) over `n` effective observations.
    pub fn from_log_likelihood(log_likelihood: f64, k: usize, n: usize) -> Self {
        let k_f = k as f64;
        let n_f = n as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k_f;
        let aicc = if n > k + 1 {
            aic + 2.0 * k_f * (k_f + 1.0) / (n_f - k_f - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = -2.0 * log_likelihood + k_f * n_f.ln();

        Self {
            log_likelihood,
            aic,
            aicc,
            bic,
        }
    }

    /// Value of the requested criterion
    pub fn get(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }
}

/// ARIMA model of a fixed order
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Whether a mean (d = 0) or drift (d = 1) term is estimated
    with_constant: bool,
}

impl ArimaModel {
    /// Create an ARIMA(p, d, q) model without a constant term
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        let order = ArimaOrder::new(p, d, q);
        Self {
            name: format!("ARIMA{}", order),
            order,
            with_constant: false,
        }
    }

    /// Estimate a mean or drift term as well
    pub fn with_constant(mut self, with_constant: bool) -> Self {
        self.with_constant = with_constant;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn fit(&self, series: &TimeSeries) -> Result<FittedArima> {
        estimate(series, self.order, self.with_constant, self.order.p)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An estimated ARIMA model together with the series it was fitted to
#[derive(Debug, Clone)]
pub struct FittedArima {
    /// Model order
    order: ArimaOrder,
    /// Mean (d = 0) or drift (d = 1) of the differenced series, if estimated
    constant: Option<f64>,
    /// AR coefficients φ1..φp
    ar: Vec<f64>,
    /// MA coefficients θ1..θq
    ma: Vec<f64>,
    /// Innovation variance
    sigma2: f64,
    /// Fit criteria
    criteria: Criteria,
    /// Series the model was fitted to
    history: TimeSeries,
    /// History differenced `d` times
    differenced: Vec<f64>,
    /// In-sample one-step residuals on the differenced scale
    residuals: Vec<f64>,
    /// How this model was selected, when it came from a search
    search: Option<SearchReport>,
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimated mean or drift term
    pub fn constant(&self) -> Option<f64> {
        self.constant
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Report of the order search that selected this model
    pub fn search(&self) -> Option<&SearchReport> {
        self.search.as_ref()
    }

    pub(crate) fn with_search(mut self, report: SearchReport) -> Self {
        self.search = Some(report);
        self
    }

    /// Name of the constant term for this differencing order
    fn constant_label(&self) -> &'static str {
        if self.order.d == 0 {
            "mean"
        } else {
            "drift"
        }
    }

    fn mu(&self) -> f64 {
        self.constant.unwrap_or(0.0)
    }
}

impl FittedModel for FittedArima {
    fn forecast_values(&self, horizon: usize) -> Result<Vec<f64>> {
        let p = self.order.p;
        let q = self.order.q;
        let mu = self.mu();
        let n = self.differenced.len();

        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        w.reserve(horizon);
        e.reserve(horizon);

        for t in n..n + horizon {
            let mut prediction = mu;
            for (i, phi) in self.ar.iter().enumerate().take(p) {
                if let Some(past) = t.checked_sub(i + 1) {
                    prediction += phi * (w[past] - mu);
                }
            }
            for (j, theta) in self.ma.iter().enumerate().take(q) {
                if let Some(past) = t.checked_sub(j + 1) {
                    prediction += theta * e[past];
                }
            }
            w.push(prediction);
            e.push(0.0);
        }

        let values = integrate(&w[n..], self.history.values(), self.order.d)?;
        Ok(values)
    }

    fn forecast_std_errors(&self, horizon: usize) -> Result<Vec<f64>> {
        let psi = psi_weights(&self.ar, &self.ma, self.order.d, horizon);
        let mut cumulative = 0.0;
        Ok(psi
            .iter()
            .map(|weight| {
                cumulative += weight * weight;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect())
    }

    fn history(&self) -> &TimeSeries {
        &self.history
    }

    fn name(&self) -> String {
        let mut name = format!("ARIMA{}", self.order);
        match (self.constant, self.order.d) {
            (Some(_), 0) => name.push_str(" with non-zero mean"),
            (Some(_), _) => name.push_str(" with drift"),
            (None, 0) => name.push_str(" with zero mean"),
            (None, _) => {}
        }
        name
    }
}

impl fmt::Display for FittedArima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Series: {}", self.history.name())?;
        writeln!(f, "{}", FittedModel::name(self))?;

        let mut coefficients: Vec<(String, f64)> = Vec::new();
        for (i, phi) in self.ar.iter().enumerate() {
            coefficients.push((format!("ar{}", i + 1), *phi));
        }
        for (j, theta) in self.ma.iter().enumerate() {
            coefficients.push((format!("ma{}", j + 1), *theta));
        }
        if let Some(c) = self.constant {
            coefficients.push((self.constant_label().to_string(), c));
        }

        if !coefficients.is_empty() {
            writeln!(f)?;
            writeln!(f, "Coefficients:")?;
            for (label, value) in &coefficients {
                writeln!(f, "  {:<6} {:>10.4}", label, value)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "sigma^2 = {:.4}   log likelihood = {:.2}",
            self.sigma2, self.criteria.log_likelihood
        )?;
        writeln!(
            f,
            "AIC = {:.2}   AICc = {:.2}   BIC = {:.2}",
            self.criteria.aic, self.criteria.aicc, self.criteria.bic
        )?;
        write!(f, "Observations: {}", self.history.len())
    }
}

/// One-step residuals of an ARMA model on the (already differenced) series.
///
/// The first `presample` observations only condition the recursion: their
/// residuals are zero and excluded from the sum of squares returned alongside.
/// `presample` must be at least the AR order.
fn css_residuals(w: &[f64], ar: &[f64], ma: &[f64], mu: f64, presample: usize) -> (Vec<f64>, f64) {
    let mut e = vec![0.0; w.len()];
    let mut css = 0.0;

    for t in presample..w.len() {
        let mut prediction = mu;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * (w[t - 1 - i] - mu);
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                prediction += theta * e[t - 1 - j];
            }
        }
        e[t] = w[t] - prediction;
        css += e[t] * e[t];
    }

    (e, css)
}

/// Split an optimizer point into AR, MA and constant parts
fn unpack(params: &[f64], p: usize, q: usize, with_constant: bool) -> (&[f64], &[f64], f64) {
    let ar = &params[..p];
    let ma = &params[p..p + q];
    let mu = if with_constant { params[p + q] } else { 0.0 };
    (ar, ma, mu)
}

/// Root mean square of `values`, or 1 when it is zero or undefined
fn scale_of(values: &[f64]) -> f64 {
    let rms = (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt();
    if rms.is_finite() && rms > 0.0 {
        rms
    } else {
        1.0
    }
}

/// Estimate an ARIMA model of the given order on `series`.
///
/// Coefficients minimize the conditional sum of squares over the differenced
/// observations after the first `presample`, which must be at least `p`.
/// Models fitted with the same `presample` share their likelihood sample, so
/// their criteria can be compared. Non-stationary AR or non-invertible MA
/// parameters are excluded from the search region.
pub(crate) fn estimate(
    series: &TimeSeries,
    order: ArimaOrder,
    with_constant: bool,
    presample: usize,
) -> Result<FittedArima> {
    let ArimaOrder { p, d, q } = order;
    if with_constant && d > 1 {
        return Err(ForecastError::InvalidInput(format!(
            "A constant term is not supported for ARIMA{} (d > 1)",
            order
        )));
    }
    if presample < p {
        return Err(ForecastError::InvalidInput(format!(
            "ARIMA{} needs at least {} presample observations, got {}",
            order, p, presample
        )));
    }

    let differenced = difference(series.values(), d);
    let k = p + q + usize::from(with_constant) + 1;
    if differenced.len() <= presample + k {
        return Err(ForecastError::FitFailure(format!(
            "ARIMA{} needs more than {} differenced observations, have {}",
            order,
            presample + k,
            differenced.len()
        )));
    }

    // Optimize on unit scale so the search path does not depend on the units
    let scale = scale_of(&differenced);
    let scaled: Vec<f64> = differenced.iter().map(|v| v / scale).collect();

    let mut initial = vec![0.0; p + q];
    if with_constant {
        initial.push(mean(&scaled)?);
    }

    let objective = |params: &[f64]| {
        let (ar, ma, mu) = unpack(params, p, q, with_constant);
        if !is_stationary(ar) || !is_invertible(ma) {
            return f64::INFINITY;
        }
        let (_, css) = css_residuals(&scaled, ar, ma, mu, presample);
        if css.is_finite() {
            css
        } else {
            f64::INFINITY
        }
    };

    let result = nelder_mead(objective, &initial, &NelderMeadConfig::default());
    if !result.value.is_finite() {
        return Err(ForecastError::FitFailure(format!(
            "No admissible parameters found for ARIMA{}",
            order
        )));
    }

    let (ar, ma, mu_scaled) = unpack(&result.point, p, q, with_constant);
    let mu = mu_scaled * scale;
    let (residuals, css) = css_residuals(&differenced, ar, ma, mu, presample);

    let n_eff = differenced.len() - presample;
    let sigma2 = css / n_eff as f64;
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(ForecastError::FitFailure(format!(
            "ARIMA{} produced a degenerate innovation variance {}",
            order, sigma2
        )));
    }
    let log_likelihood = -0.5 * n_eff as f64 * ((2.0 * PI * sigma2).ln() + 1.0);
    let criteria = Criteria::from_log_likelihood(log_likelihood, k, n_eff);

    Ok(FittedArima {
        order,
        constant: with_constant.then_some(mu),
        ar: ar.to_vec(),
        ma: ma.to_vec(),
        sigma2,
        criteria,
        history: series.clone(),
        differenced,
        residuals,
        search: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| crate::utils::add_months(start, i as u32).unwrap())
            .collect();
        TimeSeries::new("TEST", dates, values).unwrap()
    }

    fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut values = Vec::with_capacity(n);
        let mut last = 0.0;
        for _ in 0..n {
            last = phi * last + noise.sample(&mut rng);
            values.push(last);
        }
        values
    }

    #[test]
    fn test_order_display() {
        assert_eq!(ArimaOrder::new(2, 1, 0).to_string(), "(2,1,0)");
    }

    #[test]
    fn test_criteria() {
        let criteria = Criteria::from_log_likelihood(-10.0, 2, 20);
        assert_relative_eq!(criteria.aic, 24.0);
        assert_relative_eq!(criteria.aicc, 24.0 + 12.0 / 17.0);
        assert_relative_eq!(criteria.bic, 20.0 + 2.0 * 20f64.ln());
        assert_eq!(criteria.get(InformationCriterion::Aic), criteria.aic);

        // correction undefined
        assert!(Criteria::from_log_likelihood(-10.0, 3, 4).aicc.is_infinite());
    }

    #[test]
    fn test_estimate_ar1() {
        let series = monthly(ar1(0.6, 400, 7));
        let fitted = estimate(&series, ArimaOrder::new(1, 0, 0), false, 1).unwrap();

        assert!((fitted.ar_coefficients()[0] - 0.6).abs() < 0.1);
        assert!((fitted.sigma2() - 1.0).abs() < 0.2);
        assert!(fitted.constant().is_none());
        assert_eq!(fitted.residuals().len(), 400);
    }

    #[test]
    fn test_estimate_drift() {
        let mut rng = StdRng::seed_from_u64(11);
        let noise = Normal::new(0.0, 0.1).unwrap();
        let mut level = 100.0;
        let values: Vec<f64> = (0..120)
            .map(|_| {
                level += 0.5 + noise.sample(&mut rng);
                level
            })
            .collect();
        let series = monthly(values);

        let fitted = estimate(&series, ArimaOrder::new(0, 1, 0), true, 0).unwrap();
        assert!((fitted.constant().unwrap() - 0.5).abs() < 0.05);
        assert_eq!(FittedModel::name(&fitted), "ARIMA(0,1,0) with drift");

        let forecast = fitted.forecast_values(3).unwrap();
        assert_eq!(forecast.len(), 3);
        let last = series.last_value();
        let drift = fitted.constant().unwrap();
        assert_relative_eq!(forecast[0], last + drift, epsilon = 1e-9);
        assert_relative_eq!(forecast[2], last + 3.0 * drift, epsilon = 1e-9);
    }

    #[test]
    fn test_std_errors_grow_for_integrated_model() {
        let values: Vec<f64> = ar1(0.3, 150, 3)
            .iter()
            .scan(0.0, |level, x| {
                *level += x;
                Some(*level)
            })
            .collect();
        let fitted = estimate(&monthly(values), ArimaOrder::new(1, 1, 0), false, 1).unwrap();

        let se = fitted.forecast_std_errors(6).unwrap();
        assert_eq!(se.len(), 6);
        assert_relative_eq!(se[0], fitted.sigma2().sqrt(), epsilon = 1e-12);
        assert!(se.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_estimate_rejects_constant_with_double_differencing() {
        let series = monthly(ar1(0.5, 50, 1));
        assert!(matches!(
            estimate(&series, ArimaOrder::new(0, 2, 0), true, 0),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimate_too_short() {
        let series = monthly(vec![1.0, 2.0, 4.0, 3.0]);
        assert!(matches!(
            estimate(&series, ArimaOrder::new(2, 1, 2), true, 2),
            Err(ForecastError::FitFailure(_))
        ));
    }

    #[test]
    fn test_presample_shorter_than_ar_order() {
        let series = monthly(ar1(0.5, 60, 2));
        assert!(matches!(
            estimate(&series, ArimaOrder::new(3, 0, 0), false, 2),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_shared_presample_makes_criteria_comparable_across_units() {
        let values = ar1(0.4, 240, 19);
        let gap = |factor: f64| {
            let series = monthly(values.iter().map(|v| v * factor + 3.0 * factor).collect());
            let small = estimate(&series, ArimaOrder::new(1, 0, 0), true, 5).unwrap();
            let large = estimate(&series, ArimaOrder::new(5, 0, 0), true, 5).unwrap();
            large.criteria().aicc - small.criteria().aicc
        };

        // extra lags pay their penalty whatever the units
        assert_relative_eq!(gap(0.1), gap(10.0), epsilon = 1e-3);
        assert_relative_eq!(gap(1.0), gap(100.0), epsilon = 1e-3);
    }

    #[test]
    fn test_summary_display() {
        let series = monthly(ar1(0.5, 100, 5).iter().map(|v| v + 10.0).collect());
        let fitted = estimate(&series, ArimaOrder::new(1, 0, 0), true, 1).unwrap();
        let summary = fitted.to_string();

        assert!(summary.starts_with("Series: TEST\nARIMA(1,0,0) with non-zero mean"));
        assert!(summary.contains("ar1"));
        assert!(summary.contains("mean"));
        assert!(summary.contains("AICc"));
    }
}
