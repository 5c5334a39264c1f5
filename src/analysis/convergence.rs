// src/analysis/convergence.rs
//! Error-versus-effort sweeps against a closed-form oracle
//!
//! A sweep prices the same option over a grid of [`SimulationConfig`]s and
//! records, for each point, the estimate, its signed error against the
//! oracle and the wall-clock time. Two grids are provided:
//!
//! - [`path_count_grid`]: N fixed, M varying. Measures statistical error,
//!   which shrinks like 1/√M.
//! - [`step_count_grid`]: M fixed, N varying. With Euler-Maruyama this
//!   exposes the O(Δt) weak discretization bias.
//!
//! [`ConvergenceAnalyzer::repeated_trials`] measures the estimator's own
//! variance by pricing many independent replicas in parallel.

use crate::config::{MarketParameters, SimulationConfig};
use crate::error::{McError, McResult};
use crate::math_utils::{sample_variance, Timer};
use crate::mc::estimate::PriceEstimate;
use crate::mc::mc_engine::McEstimator;
use crate::mc::payoffs::Payoff;
use crate::rng::SeededSource;
use ndarray::Array1;
use rayon::prelude::*;

/// What a sweep does with a grid point that cannot be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    /// Stop at the first failing point with `SweepAborted`
    #[default]
    Abort,
    /// Log a warning, drop the point and carry on
    SkipInvalid,
}

/// One priced grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergencePoint {
    pub config: SimulationConfig,
    pub estimate: PriceEstimate,
    /// estimate - oracle
    pub error: f64,
    pub elapsed_ms: f64,
}

impl ConvergencePoint {
    pub fn abs_error(&self) -> f64 {
        self.error.abs()
    }
}

/// Spread of an estimator over independent replicas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    pub trials: usize,
    /// Mean of the replica prices
    pub mean: f64,
    /// Sample variance of the replica prices
    pub variance: f64,
    /// mean - oracle
    pub bias: f64,
    /// Root mean squared replica error against the oracle
    pub rmse: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvergenceAnalyzer {
    pub estimator: McEstimator,
    pub policy: SweepPolicy,
}

impl ConvergenceAnalyzer {
    pub fn new(estimator: McEstimator) -> Self {
        ConvergenceAnalyzer {
            estimator,
            policy: SweepPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SweepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Price `payoff` at every grid point, in grid order.
    ///
    /// Every point draws from its own `SeededSource::from_config`, so a grid
    /// with seeds reproduces exactly.
    pub fn analyze(
        &self,
        market: &MarketParameters,
        payoff: &Payoff,
        oracle: f64,
        grid: &[SimulationConfig],
    ) -> McResult<Vec<ConvergencePoint>> {
        let mut points = Vec::with_capacity(grid.len());

        for (index, config) in grid.iter().enumerate() {
            let mut timer = Timer::new();
            timer.start();
            let mut source = SeededSource::from_config(config);

            match self.estimator.price(market, config, payoff, &mut source) {
                Ok(estimate) => {
                    let point = ConvergencePoint {
                        config: *config,
                        estimate,
                        error: estimate.price - oracle,
                        elapsed_ms: timer.elapsed_ms(),
                    };
                    tracing::debug!(
                        index,
                        paths = config.paths,
                        steps = config.steps,
                        price = estimate.price,
                        error = point.error,
                        elapsed_ms = point.elapsed_ms,
                        "sweep point"
                    );
                    points.push(point);
                }
                Err(err) => match self.policy {
                    SweepPolicy::Abort => {
                        return Err(McError::SweepAborted {
                            index,
                            source: Box::new(err),
                        })
                    }
                    SweepPolicy::SkipInvalid => {
                        tracing::warn!(
                            index,
                            paths = config.paths,
                            steps = config.steps,
                            error = %err,
                            "skipping sweep point"
                        );
                    }
                },
            }
        }
        Ok(points)
    }

    /// Price `trials` independent replicas of `sim` in parallel.
    ///
    /// Replica streams are split from `SeededSource::from_config(sim)` before
    /// any work starts, so the summary does not depend on the thread count.
    pub fn repeated_trials(
        &self,
        market: &MarketParameters,
        payoff: &Payoff,
        sim: &SimulationConfig,
        trials: usize,
        oracle: f64,
    ) -> McResult<TrialSummary> {
        if trials < 2 {
            return Err(McError::InvalidConfiguration {
                field: "trials".to_string(),
                reason: format!("need at least 2 trials to measure variance, got {}", trials),
            });
        }
        sim.validate()?;

        let mut master = SeededSource::from_config(sim);
        let sources: Vec<SeededSource> = (0..trials).map(|_| master.split()).collect();

        let prices: Vec<f64> = sources
            .into_par_iter()
            .map(|mut source| {
                self.estimator
                    .price(market, sim, payoff, &mut source)
                    .map(|estimate| estimate.price)
            })
            .collect::<McResult<Vec<f64>>>()?;
        let prices = Array1::from_vec(prices);

        let mean = prices.mean().unwrap_or(f64::NAN);
        let variance = sample_variance(prices.view()).unwrap_or(0.0);
        let mse = prices.mapv(|p| (p - oracle).powi(2)).mean().unwrap_or(f64::NAN);

        let summary = TrialSummary {
            trials,
            mean,
            variance,
            bias: mean - oracle,
            rmse: mse.sqrt(),
        };
        tracing::debug!(
            method = self.estimator.method(),
            trials,
            paths = sim.paths,
            steps = sim.steps,
            mean = summary.mean,
            variance = summary.variance,
            rmse = summary.rmse,
            "repeated trials"
        );
        Ok(summary)
    }
}

/// Fixed `steps`, one point per entry of `paths`, all sharing `seed`.
///
/// Entries are not validated here; invalid ones surface in
/// [`ConvergenceAnalyzer::analyze`] according to its policy.
pub fn path_count_grid(paths: &[usize], steps: usize, seed: Option<u64>) -> Vec<SimulationConfig> {
    paths
        .iter()
        .map(|&paths| SimulationConfig { paths, steps, seed })
        .collect()
}

/// Fixed `paths`, one point per entry of `steps`, all sharing `seed`.
pub fn step_count_grid(paths: usize, steps: &[usize], seed: Option<u64>) -> Vec<SimulationConfig> {
    steps
        .iter()
        .map(|&steps| SimulationConfig { paths, steps, seed })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::Scheme;

    fn market() -> MarketParameters {
        MarketParameters::default()
    }

    #[test]
    fn grids_keep_order_and_seed() {
        let grid = path_count_grid(&[10, 100, 1000], 4, Some(9));
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], SimulationConfig { paths: 100, steps: 4, seed: Some(9) });

        let grid = step_count_grid(500, &[1, 2, 4], None);
        assert_eq!(grid.iter().map(|c| c.steps).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert!(grid.iter().all(|c| c.paths == 500 && c.seed.is_none()));
    }

    #[test]
    fn error_is_measured_against_the_oracle() {
        let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace));
        let grid = path_count_grid(&[1_000], 1, Some(5));
        let points = analyzer
            .analyze(&market(), &Payoff::EuropeanCall { k: 100.0 }, 10.0, &grid)
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].error, points[0].estimate.price - 10.0);
        assert_eq!(points[0].abs_error(), points[0].error.abs());
        assert!(points[0].elapsed_ms >= 0.0);
    }

    #[test]
    fn abort_reports_the_failing_index() {
        let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace));
        let grid = path_count_grid(&[100, 0, 100], 1, Some(1));
        let result = analyzer.analyze(&market(), &Payoff::EuropeanCall { k: 100.0 }, 10.45, &grid);
        match result {
            Err(McError::SweepAborted { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, McError::InvalidConfiguration { .. }));
            }
            other => panic!("expected SweepAborted, got {:?}", other),
        }
    }

    #[test]
    fn skip_invalid_drops_only_the_bad_points() {
        let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace))
            .with_policy(SweepPolicy::SkipInvalid);
        let grid = step_count_grid(100, &[1, 0, 2], Some(1));
        let points = analyzer
            .analyze(&market(), &Payoff::EuropeanCall { k: 100.0 }, 10.45, &grid)
            .unwrap();
        assert_eq!(points.iter().map(|p| p.config.steps).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn repeated_trials_are_reproducible() {
        let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace));
        let sim = SimulationConfig::new(500, 1).unwrap().with_seed(21);
        let payoff = Payoff::EuropeanCall { k: 100.0 };
        let a = analyzer.repeated_trials(&market(), &payoff, &sim, 16, 10.45).unwrap();
        let b = analyzer.repeated_trials(&market(), &payoff, &sim, 16, 10.45).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials, 16);
        assert!(a.variance > 0.0);
        assert!(a.rmse >= a.bias.abs());
    }

    #[test]
    fn repeated_trials_need_two_replicas() {
        let analyzer = ConvergenceAnalyzer::default();
        let sim = SimulationConfig::new(10, 1).unwrap().with_seed(1);
        let result =
            analyzer.repeated_trials(&market(), &Payoff::EuropeanCall { k: 100.0 }, &sim, 1, 10.45);
        assert!(matches!(result, Err(McError::InvalidConfiguration { .. })));
    }
}
