//! Automatic ARIMA order selection
//!
//! The differencing order is chosen by repeated KPSS tests, then the AR and MA
//! orders are searched stepwise (Hyndman-Khandakar) or over the full grid,
//! ranking candidates by an information criterion.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::{estimate, ArimaOrder, FittedArima, InformationCriterion};
use crate::models::ForecastModel;
use inflation_math::polynomial::{is_invertible, is_stationary};
use inflation_math::stationarity::ndiffs;
use inflation_math::stats::is_constant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Shortest series the search will accept
pub const MIN_OBSERVATIONS: usize = 10;

/// Order in which neighbours of the current best model are visited
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

/// Search settings for [`AutoArima`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    /// Largest AR order considered
    pub max_p: usize,
    /// Largest MA order considered
    pub max_q: usize,
    /// Largest differencing order considered
    pub max_d: usize,
    /// Largest p + q considered
    pub max_order: usize,
    /// Stepwise search instead of the full grid
    pub stepwise: bool,
    /// Criterion used to rank candidates
    pub information_criterion: InformationCriterion,
    /// Significance level of the KPSS tests choosing d
    pub alpha: f64,
    /// Upper limit on the number of candidate fits
    pub max_fits: usize,
    /// Trace every candidate at info level
    pub verbose: bool,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_order: 5,
            stepwise: true,
            information_criterion: InformationCriterion::Aicc,
            alpha: 0.05,
            max_fits: 100,
            verbose: false,
        }
    }
}

impl AutoArimaConfig {
    pub fn with_max_orders(mut self, max_p: usize, max_q: usize, max_order: usize) -> Self {
        self.max_p = max_p;
        self.max_q = max_q;
        self.max_order = max_order;
        self
    }

    pub fn with_max_d(mut self, max_d: usize) -> Self {
        self.max_d = max_d;
        self
    }

    pub fn with_stepwise(mut self, stepwise: bool) -> Self {
        self.stepwise = stepwise;
        self
    }

    pub fn with_information_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.information_criterion = criterion;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_fits(mut self, max_fits: usize) -> Self {
        self.max_fits = max_fits;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// One model tried during the search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub order: ArimaOrder,
    pub with_constant: bool,
    /// Criterion value, `None` if the fit failed or was inadmissible
    pub criterion: Option<f64>,
}

/// Record of an order search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    /// Criterion the candidates were ranked by
    pub information_criterion: InformationCriterion,
    /// Differencing order chosen by the KPSS tests
    pub d: usize,
    /// Whether the stepwise search was used
    pub stepwise: bool,
    /// Every candidate in the order it was fitted
    pub candidates: Vec<Candidate>,
}

impl SearchReport {
    /// Number of candidates fitted
    pub fn fits(&self) -> usize {
        self.candidates.len()
    }

    /// Candidates that produced a finite criterion
    pub fn valid(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.criterion.is_some())
    }
}

/// ARIMA model with automatically selected order
#[derive(Debug, Clone)]
pub struct AutoArima {
    /// Name of the model
    name: String,
    /// Search settings
    config: AutoArimaConfig,
}

impl AutoArima {
    pub fn new(config: AutoArimaConfig) -> Self {
        Self {
            name: "Auto ARIMA".to_string(),
            config,
        }
    }

    pub fn config(&self) -> &AutoArimaConfig {
        &self.config
    }
}

impl Default for AutoArima {
    fn default() -> Self {
        Self::new(AutoArimaConfig::default())
    }
}

impl ForecastModel for AutoArima {
    type Fitted = FittedArima;

    fn fit(&self, series: &TimeSeries) -> Result<FittedArima> {
        let config = &self.config;
        if series.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::FitFailure(format!(
                "At least {} observations are needed, have {}",
                MIN_OBSERVATIONS,
                series.len()
            )));
        }
        if is_constant(series.values()) {
            return Err(ForecastError::FitFailure(format!(
                "Series '{}' is constant",
                series.name()
            )));
        }

        let d = ndiffs(series.values(), config.alpha, config.max_d).map_err(|e| {
            ForecastError::InvalidInput(format!("Cannot choose the differencing order: {}", e))
        })?;
        if config.verbose {
            info!(d, "differencing order chosen by KPSS");
        }

        let mut search = Search::new(series, d, config);
        if config.stepwise {
            search.stepwise();
        } else {
            search.grid();
        }
        search.finish()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// State of one order search
struct Search<'a> {
    series: &'a TimeSeries,
    d: usize,
    config: &'a AutoArimaConfig,
    /// Observations every candidate conditions on, the largest reachable p
    presample: usize,
    tried: HashSet<(usize, usize, bool)>,
    candidates: Vec<Candidate>,
    best: Option<(f64, FittedArima)>,
}

impl<'a> Search<'a> {
    fn new(series: &'a TimeSeries, d: usize, config: &'a AutoArimaConfig) -> Self {
        Self {
            series,
            d,
            config,
            presample: config.max_p.min(config.max_order),
            tried: HashSet::new(),
            candidates: Vec::new(),
            best: None,
        }
    }

    fn exhausted(&self) -> bool {
        self.candidates.len() >= self.config.max_fits
    }

    fn admissible(&self, p: usize, q: usize, with_constant: bool) -> bool {
        p <= self.config.max_p
            && q <= self.config.max_q
            && p + q <= self.config.max_order
            && (!with_constant || self.d <= 1)
    }

    /// Fit a candidate unless it was already tried or is out of bounds.
    /// Returns true when it became the new best model.
    fn consider(&mut self, p: usize, q: usize, with_constant: bool) -> bool {
        if self.exhausted()
            || !self.admissible(p, q, with_constant)
            || !self.tried.insert((p, q, with_constant))
        {
            return false;
        }

        let order = ArimaOrder::new(p, self.d, q);
        let ic = self.config.information_criterion;
        let fitted = estimate(self.series, order, with_constant, self.presample).ok().filter(|m| {
            is_stationary(m.ar_coefficients())
                && is_invertible(m.ma_coefficients())
                && m.criteria().get(ic).is_finite()
        });
        let score = fitted.as_ref().map(|m| m.criteria().get(ic));

        if self.config.verbose {
            match score {
                Some(value) => info!(order = %order, with_constant, criterion = %ic, value, "fitted candidate"),
                None => info!(order = %order, with_constant, "candidate failed"),
            }
        }

        self.candidates.push(Candidate {
            order,
            with_constant,
            criterion: score,
        });

        let (Some(score), Some(fitted)) = (score, fitted) else {
            return false;
        };
        let improves = self
            .best
            .as_ref()
            .map_or(true, |(best_score, _)| score < *best_score);
        if improves {
            self.best = Some((score, fitted));
        }
        improves
    }

    fn stepwise(&mut self) {
        let drift = self.d <= 1;
        self.consider(2, 2, drift);
        self.consider(0, 0, drift);
        self.consider(1, 0, drift);
        self.consider(0, 1, drift);
        self.consider(0, 0, false);

        while let Some((_, current)) = &self.best {
            if self.exhausted() {
                break;
            }
            let order = current.order();
            let with_constant = current.constant().is_some();

            let mut moves: Vec<(usize, usize, bool)> = NEIGHBOURS
                .iter()
                .filter_map(|(dp, dq)| {
                    let p = usize::try_from(order.p as i64 + dp).ok()?;
                    let q = usize::try_from(order.q as i64 + dq).ok()?;
                    Some((p, q, with_constant))
                })
                .collect();
            moves.push((order.p, order.q, !with_constant));

            let moved = moves
                .into_iter()
                .any(|(p, q, c)| self.consider(p, q, c));
            if !moved {
                break;
            }
        }
    }

    fn grid(&mut self) {
        let constants: &[bool] = if self.d <= 1 { &[true, false] } else { &[false] };
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for &with_constant in constants {
                    self.consider(p, q, with_constant);
                }
            }
        }
    }

    fn finish(self) -> Result<FittedArima> {
        let report = SearchReport {
            information_criterion: self.config.information_criterion,
            d: self.d,
            stepwise: self.config.stepwise,
            candidates: self.candidates,
        };

        match self.best {
            Some((score, fitted)) => {
                if self.config.verbose {
                    info!(
                        order = %fitted.order(),
                        criterion = %report.information_criterion,
                        score,
                        fits = report.fits(),
                        "selected model"
                    );
                }
                Ok(fitted.with_search(report))
            }
            None => Err(ForecastError::FitFailure(format!(
                "None of the {} ARIMA candidates with d = {} could be fitted to '{}'",
                report.fits(),
                report.d,
                self.series.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FittedModel;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2005, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| crate::utils::add_months(start, i as u32).unwrap())
            .collect();
        TimeSeries::new("CPI", dates, values).unwrap()
    }

    fn trending(n: usize, seed: u64) -> TimeSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 0.15).unwrap();
        let mut level = 200.0;
        let values = (0..n)
            .map(|_| {
                level += 0.4 + noise.sample(&mut rng);
                level
            })
            .collect();
        monthly(values)
    }

    #[test]
    fn test_rejects_short_series() {
        let series = monthly((0..9).map(|i| i as f64).collect());
        assert!(matches!(
            AutoArima::default().fit(&series),
            Err(ForecastError::FitFailure(_))
        ));
    }

    #[test]
    fn test_rejects_constant_series() {
        let series = monthly(vec![250.0; 40]);
        assert!(matches!(
            AutoArima::default().fit(&series),
            Err(ForecastError::FitFailure(_))
        ));
    }

    #[test]
    fn test_trending_series_is_differenced() {
        let fitted = AutoArima::default().fit(&trending(120, 42)).unwrap();
        let report = fitted.search().unwrap();

        assert_eq!(fitted.order().d, 1);
        assert_eq!(report.d, 1);
        assert!(report.fits() >= 4);
        assert!(report.fits() <= 100);
    }

    #[test]
    fn test_selected_model_minimizes_criterion() {
        let fitted = AutoArima::default().fit(&trending(100, 8)).unwrap();
        let report = fitted.search().unwrap();
        let selected = fitted.criteria().get(report.information_criterion);

        let minimum = report
            .valid()
            .filter_map(|c| c.criterion)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(selected, minimum);
    }

    #[test]
    fn test_search_is_deterministic() {
        let series = trending(90, 5);
        let model = AutoArima::default();
        let first = model.fit(&series).unwrap();
        let second = model.fit(&series).unwrap();

        assert_eq!(first.order(), second.order());
        assert_eq!(
            first.forecast_values(6).unwrap(),
            second.forecast_values(6).unwrap()
        );
    }

    #[test]
    fn test_max_fits_limits_search() {
        let config = AutoArimaConfig::default().with_max_fits(3);
        let fitted = AutoArima::new(config).fit(&trending(80, 1)).unwrap();
        assert_eq!(fitted.search().unwrap().fits(), 3);
    }

    #[test]
    fn test_grid_search_respects_bounds() {
        let config = AutoArimaConfig::default()
            .with_stepwise(false)
            .with_max_orders(1, 1, 2);
        let fitted = AutoArima::new(config).fit(&trending(80, 3)).unwrap();
        let report = fitted.search().unwrap();

        assert!(!report.stepwise);
        // 4 (p, q) pairs, each with and without drift
        assert_eq!(report.fits(), 8);
        assert!(report
            .candidates
            .iter()
            .all(|c| c.order.p <= 1 && c.order.q <= 1));
    }

    #[test]
    fn test_no_constant_when_twice_differenced() {
        let config = AutoArimaConfig::default().with_stepwise(false).with_max_orders(1, 1, 1);
        let mut search_series = Vec::new();
        let mut level = 0.0;
        let mut slope = 0.0;
        let mut rng = StdRng::seed_from_u64(9);
        let noise = Normal::new(0.0, 1.0).unwrap();
        for _ in 0..150 {
            slope += noise.sample(&mut rng);
            level += slope;
            search_series.push(level);
        }

        let fitted = AutoArima::new(config).fit(&monthly(search_series)).unwrap();
        let report = fitted.search().unwrap();
        if report.d == 2 {
            assert!(report.candidates.iter().all(|c| !c.with_constant));
            assert!(fitted.constant().is_none());
        }
    }
}
