// src/mc/mc_engine.rs
use crate::analytics::asian_analytic::{geometric_asian_call_price, GeometricAveraging};
use crate::analytics::bs_analytic::bs_call_price;
use crate::config::{MarketParameters, SimulationConfig};
use crate::error::{validation::*, McError, McResult};
use crate::math_utils::{sample_covariance, sample_variance};
use crate::mc::estimate::PriceEstimate;
use crate::mc::paths::PathLayout;
use crate::mc::payoffs::{Payoff, PayoffVector};
use crate::rng::NormalSource;
use crate::solvers::{EulerMaruyama, LogSpaceSampler, NegativePricePolicy, PathGenerator, Scheme};
use ndarray::{Array2, Zip};

/// Below this sample variance the control carries no information.
const MIN_CONTROL_VARIANCE: f64 = 1e-10;

/// Instrument with a known price, simulated alongside the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlVariate {
    pub payoff: Payoff,
    /// Discounted closed-form price
    pub price: f64,
    /// Step count the closed form assumes, for discretely monitored controls
    pub steps: Option<usize>,
}

impl ControlVariate {
    pub fn new(payoff: Payoff, price: f64) -> Self {
        ControlVariate {
            payoff,
            price,
            steps: None,
        }
    }

    /// Discretely monitored geometric Asian call at the market strike.
    ///
    /// Averages the same S_0..S_N grid as the arithmetic Asian payoff, so the
    /// simulation must run with exactly `steps` steps.
    pub fn geometric_asian(market: &MarketParameters, steps: usize) -> McResult<Self> {
        let price = geometric_asian_call_price(
            market.spot(),
            market.strike(),
            market.rate(),
            market.volatility(),
            market.maturity(),
            GeometricAveraging::Discrete { steps },
        )?;
        Ok(ControlVariate {
            payoff: Payoff::AsianGeometricCall { k: market.strike() },
            price,
            steps: Some(steps),
        })
    }

    /// European call at the market strike, priced by Black-Scholes.
    pub fn european_call(market: &MarketParameters) -> McResult<Self> {
        let price = bs_call_price(
            market.spot(),
            market.strike(),
            market.rate(),
            market.volatility(),
            market.maturity(),
        )?;
        Ok(ControlVariate::new(Payoff::EuropeanCall { k: market.strike() }, price))
    }

    fn validate(&self, steps: usize) -> McResult<()> {
        validate_finite("control price", self.price)?;
        match self.steps {
            Some(expected) if expected != steps => Err(McError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: format!(
                    "{} control is priced for {} steps but the simulation uses {}",
                    self.payoff.name(),
                    expected,
                    steps
                ),
            }),
            _ => Ok(()),
        }
    }
}

/// How the control-variate coefficient β is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BetaChoice {
    /// β = Cov(Y, X) / Var(X), estimated from the same batch
    #[default]
    Optimal,
    /// Caller-supplied β (β = 1 is the plain difference estimator)
    Fixed(f64),
}

/// Monte Carlo price estimator under GBM
///
/// # Variance Reduction Techniques
///
/// 1. **Antithetic Variates**: every normal matrix Z is also run as -Z and
///    the two payoffs are averaged per path. `paths` counts the pairs, so the
///    estimate is built from `paths` independent samples drawn from `paths`
///    rows of normals.
///
/// 2. **Control Variates**: target Y and control X are evaluated on the same
///    simulated batch. Estimator:
///    ```text
///    e^(-rT) mean(Y) - β (e^(-rT) mean(X) - C)
///    ```
///    with C the control's closed-form price. The closed forms are exact for
///    the log-space scheme; under Euler-Maruyama the adjusted estimate also
///    picks up the control's discretization bias.
///
/// With both enabled, target and control are pair-averaged first and β is
/// estimated on the pair averages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct McEstimator {
    pub scheme: Scheme,
    pub antithetic: bool,
    pub control: Option<ControlVariate>,
    pub beta: BetaChoice,
}

impl McEstimator {
    pub fn plain(scheme: Scheme) -> Self {
        McEstimator {
            scheme,
            ..Default::default()
        }
    }

    pub fn with_antithetic(mut self) -> Self {
        self.antithetic = true;
        self
    }

    pub fn with_control(mut self, control: ControlVariate) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_beta(mut self, beta: BetaChoice) -> Self {
        self.beta = beta;
        self
    }

    pub fn method(&self) -> &'static str {
        match (self.antithetic, self.control.is_some()) {
            (false, false) => "Monte Carlo",
            (true, false) => "antithetic Monte Carlo",
            (false, true) => "control variate Monte Carlo",
            (true, true) => "antithetic control variate Monte Carlo",
        }
    }

    /// Path data needed by the target and, if present, the control.
    pub fn layout(&self, payoff: &Payoff) -> PathLayout {
        match &self.control {
            Some(cv) => payoff.layout().union(cv.payoff.layout()),
            None => payoff.layout(),
        }
    }

    /// Price `payoff` with `sim.paths` independent draws from `source`.
    ///
    /// # Errors
    ///
    /// - Invalid simulation shape or estimator configuration
    /// - Payoff/batch mismatches
    /// - Non-finite prices or estimates
    /// - Exhaustion of a finite random source
    pub fn price(
        &self,
        market: &MarketParameters,
        sim: &SimulationConfig,
        payoff: &Payoff,
        source: &mut dyn NormalSource,
    ) -> McResult<PriceEstimate> {
        sim.validate()?;
        if let Some(cv) = &self.control {
            cv.validate(sim.steps)?;
        }
        if let BetaChoice::Fixed(beta) = self.beta {
            validate_finite("beta", beta)?;
        }

        let layout = self.layout(payoff);
        let normals =
            source.standard_normal_matrix(sim.paths, self.scheme.draws_per_path(sim.steps, layout))?;
        let (target, control) = self.evaluate(market, sim.steps, &normals, layout, payoff)?;

        let discount = market.discount_factor();
        let estimate = match (&self.control, control) {
            (Some(cv), Some(control)) => {
                let beta = self.control_beta(&target, &control);
                // C is discounted, the payoffs are not
                let undiscounted_control_price = cv.price / discount;
                let adjusted = Zip::from(&target)
                    .and(&control)
                    .map_collect(|&y, &x| y - beta * (x - undiscounted_control_price));
                PriceEstimate::from_payoffs(adjusted.view(), discount, self.method())?
                    .with_control_beta(beta)
            }
            _ => PriceEstimate::from_payoffs(target.view(), discount, self.method())?,
        };

        tracing::debug!(
            method = self.method(),
            scheme = self.scheme.name(),
            payoff = payoff.name(),
            paths = sim.paths,
            steps = sim.steps,
            price = estimate.price,
            std_error = ?estimate.std_error,
            beta = ?estimate.control_beta,
            "priced option"
        );
        Ok(estimate)
    }

    /// Target and control payoffs, pair-averaged when antithetic.
    fn evaluate(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: &Array2<f64>,
        layout: PathLayout,
        payoff: &Payoff,
    ) -> McResult<(PayoffVector, Option<PayoffVector>)> {
        let (mut target, mut control) = self.evaluate_draw(market, steps, normals, layout, payoff)?;

        if self.antithetic {
            let mirrored = normals.mapv(|z| -z);
            let (target_anti, control_anti) =
                self.evaluate_draw(market, steps, &mirrored, layout, payoff)?;
            target = (target + target_anti) * 0.5;
            control = match (control, control_anti) {
                (Some(x), Some(x_anti)) => Some((x + x_anti) * 0.5),
                _ => None,
            };
        }
        Ok((target, control))
    }

    /// One batch from `normals`, with target and control read off it.
    fn evaluate_draw(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: &Array2<f64>,
        layout: PathLayout,
        payoff: &Payoff,
    ) -> McResult<(PayoffVector, Option<PayoffVector>)> {
        let batch = self.scheme.generate(market, steps, normals.view(), layout)?;
        let target = payoff.evaluate(&batch)?;
        let control = self
            .control
            .as_ref()
            .map(|cv| cv.payoff.evaluate(&batch))
            .transpose()?;
        Ok((target, control))
    }

    fn control_beta(&self, target: &PayoffVector, control: &PayoffVector) -> f64 {
        match self.beta {
            BetaChoice::Fixed(beta) => beta,
            BetaChoice::Optimal => {
                match (
                    sample_covariance(target.view(), control.view()),
                    sample_variance(control.view()),
                ) {
                    (Some(cov), Some(var)) if var > MIN_CONTROL_VARIANCE => cov / var,
                    _ => {
                        tracing::debug!(
                            samples = target.len(),
                            "control variate has no usable variance, using beta = 0"
                        );
                        0.0
                    }
                }
            }
        }
    }
}

/// Weak discretization bias of Euler-Maruyama for `payoff`
///
/// Both schemes are driven by the same normal matrix: Euler integrates the
/// SDE over `sim.steps` steps and the log-space sampler builds the exact path
/// on the same grid. The mean of the discounted payoff difference is the
/// Euler price bias; because the two paths are strongly coupled its standard
/// error is far below that of either price alone.
pub fn price_discretization_bias(
    market: &MarketParameters,
    sim: &SimulationConfig,
    payoff: &Payoff,
    policy: NegativePricePolicy,
    source: &mut dyn NormalSource,
) -> McResult<PriceEstimate> {
    sim.validate()?;
    let euler = EulerMaruyama::new(policy);
    let layout = payoff.layout();
    let normals = source.standard_normal_matrix(sim.paths, euler.draws_per_path(sim.steps, layout))?;

    let approx = euler.generate(market, sim.steps, normals.view(), layout)?;
    let exact = LogSpaceSampler.generate(market, sim.steps, normals.view(), PathLayout::FullPath)?;
    let difference = payoff.evaluate(&approx)? - payoff.evaluate(&exact)?;

    PriceEstimate::from_payoffs(difference.view(), market.discount_factor(), "Euler discretization bias")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FixedStream, SeededSource};
    use approx::assert_relative_eq;

    fn market() -> MarketParameters {
        MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap()
    }

    #[test]
    fn same_seed_gives_bit_identical_estimates() {
        let sim = SimulationConfig::new(2_000, 16).unwrap();
        let payoff = Payoff::AsianArithmeticCall { k: 100.0 };
        for scheme in [Scheme::LogSpace, Scheme::euler()] {
            let estimator = McEstimator::plain(scheme).with_antithetic();
            let a = estimator
                .price(&market(), &sim, &payoff, &mut SeededSource::new(11))
                .unwrap();
            let b = estimator
                .price(&market(), &sim, &payoff, &mut SeededSource::new(11))
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn single_path_returns_its_discounted_payoff() {
        let sim = SimulationConfig::new(1, 1).unwrap();
        let z = 0.8;
        let est = McEstimator::plain(Scheme::LogSpace)
            .price(
                &market(),
                &sim,
                &Payoff::EuropeanCall { k: 100.0 },
                &mut FixedStream::new(vec![z]),
            )
            .unwrap();

        let s_t = 100.0 * (0.05 - 0.02 + 0.2 * z).exp();
        assert_relative_eq!(est.price, (-0.05f64).exp() * (s_t - 100.0), epsilon = 1e-12);
        assert!(est.std_error.is_none());
        assert_eq!(est.samples, 1);
    }

    #[test]
    fn single_pair_with_control_does_not_divide_by_zero() {
        let sim = SimulationConfig::new(1, 4).unwrap();
        let estimator = McEstimator::plain(Scheme::LogSpace)
            .with_antithetic()
            .with_control(ControlVariate::geometric_asian(&market(), 4).unwrap());
        let est = estimator
            .price(
                &market(),
                &sim,
                &Payoff::AsianArithmeticCall { k: 100.0 },
                &mut SeededSource::new(1),
            )
            .unwrap();
        assert!(est.price.is_finite());
        assert!(est.std_error.is_none());
        assert_eq!(est.control_beta, Some(0.0));
    }

    #[test]
    fn antithetic_pairs_consume_one_row_of_draws_each() {
        let sim = SimulationConfig::new(3, 1).unwrap();
        let mut stream = FixedStream::new(vec![0.1, 0.2, 0.3]);
        let est = McEstimator::plain(Scheme::LogSpace)
            .with_antithetic()
            .price(&market(), &sim, &Payoff::Straddle { k: 100.0 }, &mut stream)
            .unwrap();
        assert_eq!(stream.remaining(), 0);
        assert_eq!(est.samples, 3);
    }

    #[test]
    fn zero_beta_reproduces_the_plain_estimate() {
        let sim = SimulationConfig::new(5_000, 1).unwrap();
        let payoff = Payoff::EuropeanCall { k: 100.0 };
        let plain = McEstimator::plain(Scheme::LogSpace)
            .price(&market(), &sim, &payoff, &mut SeededSource::new(3))
            .unwrap();
        let controlled = McEstimator::plain(Scheme::LogSpace)
            .with_control(ControlVariate::european_call(&market()).unwrap())
            .with_beta(BetaChoice::Fixed(0.0))
            .price(&market(), &sim, &payoff, &mut SeededSource::new(3))
            .unwrap();
        assert_eq!(plain.price, controlled.price);
        assert_eq!(controlled.control_beta, Some(0.0));
    }

    #[test]
    fn target_as_its_own_control_recovers_the_closed_form() {
        let sim = SimulationConfig::new(5_000, 1).unwrap();
        let control = ControlVariate::european_call(&market()).unwrap();
        let est = McEstimator::plain(Scheme::LogSpace)
            .with_control(control)
            .price(&market(), &sim, &control.payoff, &mut SeededSource::new(8))
            .unwrap();
        assert_relative_eq!(est.control_beta.unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(est.price, control.price, epsilon = 1e-8);
        assert!(est.std_error.unwrap() < 1e-8);
    }

    #[test]
    fn control_priced_for_other_steps_is_rejected() {
        let sim = SimulationConfig::new(100, 12).unwrap();
        let estimator = McEstimator::plain(Scheme::LogSpace)
            .with_control(ControlVariate::geometric_asian(&market(), 52).unwrap());
        let result = estimator.price(
            &market(),
            &sim,
            &Payoff::AsianArithmeticCall { k: 100.0 },
            &mut SeededSource::new(1),
        );
        assert!(matches!(result, Err(McError::InvalidConfiguration { .. })));
    }

    #[test]
    fn non_finite_fixed_beta_is_rejected() {
        let sim = SimulationConfig::new(10, 1).unwrap();
        let result = McEstimator::plain(Scheme::LogSpace)
            .with_control(ControlVariate::european_call(&market()).unwrap())
            .with_beta(BetaChoice::Fixed(f64::NAN))
            .price(&market(), &sim, &Payoff::EuropeanCall { k: 100.0 }, &mut SeededSource::new(1));
        assert!(result.is_err());
    }

    #[test]
    fn exhausted_stream_surfaces_as_error() {
        let sim = SimulationConfig::new(10, 5).unwrap();
        let result = McEstimator::plain(Scheme::euler()).price(
            &market(),
            &sim,
            &Payoff::EuropeanCall { k: 100.0 },
            &mut FixedStream::new(vec![0.0; 20]),
        );
        assert!(matches!(result, Err(McError::RandomSourceExhausted { .. })));
    }

    #[test]
    fn discretization_bias_of_a_single_zero_shock() {
        // With Z = 0 the Euler step is S0 (1 + r T) and the exact step S0 e^{(r - σ²/2) T}
        let sim = SimulationConfig::new(1, 1).unwrap();
        let bias = price_discretization_bias(
            &market(),
            &sim,
            &Payoff::EuropeanCall { k: 90.0 },
            NegativePricePolicy::Absorb,
            &mut FixedStream::new(vec![0.0]),
        )
        .unwrap();
        let euler = 105.0 - 90.0;
        let exact = 100.0 * (0.03f64).exp() - 90.0;
        assert_relative_eq!(bias.price, (-0.05f64).exp() * (euler - exact), epsilon = 1e-10);
    }

    #[test]
    fn geometric_control_survives_absorbed_euler_paths() {
        // σ√dt = 0.5: a step lands below zero for Z < -2.025
        let wild = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 1.0).unwrap();
        let sim = SimulationConfig::new(10_000, 4).unwrap();

        let batch = Scheme::euler()
            .simulate(&wild, &sim, PathLayout::FullPath, &mut SeededSource::new(12))
            .unwrap();
        assert!(batch.terminal().unwrap().iter().any(|&s| s == 0.0));

        let control = ControlVariate::geometric_asian(&wild, 4).unwrap();
        let est = McEstimator::plain(Scheme::euler())
            .with_control(control)
            .price(
                &wild,
                &sim,
                &Payoff::AsianArithmeticCall { k: 100.0 },
                &mut SeededSource::new(12),
            )
            .unwrap();
        assert!(est.price.is_finite() && est.price > 0.0);
        assert!(est.control_beta.unwrap().is_finite());

        let geometric = McEstimator::plain(Scheme::euler())
            .price(&wild, &sim, &control.payoff, &mut SeededSource::new(12))
            .unwrap();
        assert!(geometric.price.is_finite() && geometric.price >= 0.0);
    }

    #[test]
    fn path_and_step_limits_do_not_multiply_into_one_batch() {
        use crate::error::validation::{MAX_PATHS, MAX_STEPS};

        let sim = SimulationConfig {
            paths: MAX_PATHS,
            steps: MAX_STEPS,
            seed: Some(1),
        };
        assert!(sim.validate().is_ok());
        let result = McEstimator::plain(Scheme::euler()).price(
            &market(),
            &sim,
            &Payoff::EuropeanCall { k: 100.0 },
            &mut SeededSource::new(1),
        );
        assert!(matches!(result, Err(McError::InvalidConfiguration { .. })));
    }
}
