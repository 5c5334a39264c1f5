// src/config.rs
//! Typed inputs shared by every pricing component.
//!
//! [`MarketParameters`] is validated once at construction and is read-only
//! afterwards. [`SimulationConfig`] keeps public fields so sweep grids can be
//! assembled freely; consumers call [`SimulationConfig::validate`] before
//! doing any work.

use crate::error::{validation::*, McResult};

/// GBM market description: spot, strike, maturity, rate and volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketParameters {
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
}

impl MarketParameters {
    /// Build validated market parameters.
    ///
    /// # Errors
    /// `InvalidParameters` when spot, strike, maturity or volatility is not
    /// strictly positive, or when any input is non-finite.
    pub fn new(spot: f64, strike: f64, maturity: f64, rate: f64, volatility: f64) -> McResult<Self> {
        validate_positive("s0", spot)?;
        validate_positive("k", strike)?;
        validate_positive("t", maturity)?;
        validate_finite("r", rate)?;
        validate_positive("sigma", volatility)?;

        Ok(Self {
            spot,
            strike,
            maturity,
            rate,
            volatility,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// e^(-rT)
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }
}

impl Default for MarketParameters {
    /// S0 = K = 100, T = 1, r = 5%, σ = 20%
    fn default() -> Self {
        MarketParameters {
            spot: 100.0,
            strike: 100.0,
            maturity: 1.0,
            rate: 0.05,
            volatility: 0.2,
        }
    }
}

/// Shape of the generated randomness: M paths of N steps, optionally seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub paths: usize,
    pub steps: usize,
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(paths: usize, steps: usize) -> McResult<Self> {
        let cfg = SimulationConfig {
            paths,
            steps,
            seed: None,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the simulation shape
    pub fn validate(&self) -> McResult<()> {
        validate_paths(self.paths)?;
        validate_steps(self.steps)?;
        Ok(())
    }

    /// Time step T/N for the given maturity.
    pub fn dt(&self, maturity: f64) -> f64 {
        maturity / self.steps as f64
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            paths: 100_000,
            steps: 1,
            seed: Some(42),
        }
    }
}
