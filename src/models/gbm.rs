// src/models/gbm.rs
//! Risk-neutral geometric Brownian motion
//!
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! S_{t+dt} = S_t * exp((r - σ²/2) dt + σ √dt Z)
//! ```

use super::model::SDEModel;
use crate::config::MarketParameters;

#[derive(Debug, Clone, Copy)]
pub struct Gbm {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Gbm {
    pub fn new(s0: f64, mu: f64, sigma: f64) -> Self {
        Gbm { s0, mu, sigma }
    }

    /// Risk-neutral dynamics: drift equals the risk-free rate.
    pub fn risk_neutral(market: &MarketParameters) -> Self {
        Gbm::new(market.spot(), market.rate(), market.volatility())
    }

    /// Deterministic part of the log increment over `dt`.
    pub fn log_drift(&self, dt: f64) -> f64 {
        (self.mu - 0.5 * self.sigma * self.sigma) * dt
    }

    /// Standard deviation of the log increment over `dt`.
    pub fn log_vol(&self, dt: f64) -> f64 {
        self.sigma * dt.sqrt()
    }

    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        s_t * (self.log_drift(dt) + self.log_vol(dt) * normal_draw).exp()
    }
}

impl SDEModel for Gbm {
    fn drift(&self, s: f64, _t: f64) -> f64 {
        self.mu * s
    }

    fn diffusion(&self, s: f64, _t: f64) -> f64 {
        self.sigma * s
    }
}
