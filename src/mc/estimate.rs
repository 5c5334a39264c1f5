// src/mc/estimate.rs
use crate::error::{validation::ensure_finite, McError, McResult};
use crate::math_utils::sample_variance;
use ndarray::ArrayView1;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Monte Carlo price with its sampling error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEstimate {
    /// Discounted mean payoff
    pub price: f64,
    /// Standard error of `price`; `None` for a single sample
    pub std_error: Option<f64>,
    /// Independent samples behind the mean (antithetic pairs count once)
    pub samples: usize,
    /// Control-variate coefficient, when one was applied
    pub control_beta: Option<f64>,
}

impl PriceEstimate {
    /// Mean and standard error of `discount × payoffs`.
    ///
    /// The discount factor is applied to the two summary statistics, not to
    /// each path.
    pub fn from_payoffs(payoffs: ArrayView1<f64>, discount: f64, method: &str) -> McResult<Self> {
        let samples = payoffs.len();
        let mean = payoffs.mean().ok_or_else(|| McError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "cannot estimate a price from zero samples".to_string(),
        })?;
        let price = ensure_finite(method, "price estimate", discount * mean)?;

        let std_error = match sample_variance(payoffs) {
            Some(variance) => {
                let se = discount.abs() * (variance / samples as f64).sqrt();
                Some(ensure_finite(method, "standard error", se)?)
            }
            None => None,
        };

        Ok(PriceEstimate {
            price,
            std_error,
            samples,
            control_beta: None,
        })
    }

    pub fn with_control_beta(mut self, beta: f64) -> Self {
        self.control_beta = Some(beta);
        self
    }

    /// Variance of the estimator, std_error².
    pub fn variance(&self) -> Option<f64> {
        self.std_error.map(|se| se * se)
    }

    /// Normal-approximation interval `price ± z · std_error`.
    pub fn confidence_interval(&self, z: f64) -> Option<(f64, f64)> {
        self.std_error
            .map(|se| (self.price - z * se, self.price + z * se))
    }
}
