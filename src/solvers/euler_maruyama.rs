// src/solvers/euler_maruyama.rs
//! Euler-Maruyama Scheme for SDE Integration
//!
//! # Mathematical Framework
//!
//! For a general SDE:
//! ```text
//! dX_t = a(X_t, t) dt + b(X_t, t) dW_t
//! ```
//!
//! The Euler-Maruyama scheme provides the discretization:
//! ```text
//! X_{n+1} = X_n + a(X_n, t_n) Δt + b(X_n, t_n) ΔW_n
//! ```
//!
//! For GBM this is `S ← S + r S Δt + σ S √Δt Z`.
//!
//! # Convergence Properties
//!
//! - **Strong convergence**: Order 0.5 in step size
//! - **Weak convergence**: Order 1.0 in step size, so the price bias is O(Δt)
//!
//! # Negative prices
//!
//! The additive update can undershoot zero when σ√Δt is large. The
//! [`NegativePricePolicy`] decides what happens then. Under `Absorb` a
//! negative update is clamped to 0, and since both GBM coefficients vanish
//! at 0 the path stays there.
//!
//! # Vectorisation
//!
//! Steps are inherently sequential. Within a step the update is applied to
//! the whole M-vector of states with a rayon-backed `Zip`.

use super::{check_finite_prices, check_normals, PathGenerator};
use crate::config::MarketParameters;
use crate::error::McResult;
use crate::mc::paths::{PathBatch, PathLayout};
use crate::models::gbm::Gbm;
use crate::models::model::SDEModel;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis, Zip};

/// Treatment of prices pushed below zero by the additive Euler update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativePricePolicy {
    /// Clamp at zero; zero is absorbing for GBM
    #[default]
    Absorb,
    /// Keep the raw scheme output, negative values included
    Allow,
}

impl NegativePricePolicy {
    #[inline]
    pub fn apply(self, s: f64) -> f64 {
        match self {
            // NaN compares false and is left for the finiteness check
            NegativePricePolicy::Absorb if s < 0.0 => 0.0,
            _ => s,
        }
    }
}

/// Euler-Maruyama numerical scheme for SDE integration
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerMaruyama {
    pub policy: NegativePricePolicy,
}

impl EulerMaruyama {
    pub fn new(policy: NegativePricePolicy) -> Self {
        EulerMaruyama { policy }
    }

    /// One Euler-Maruyama step applied to every path.
    ///
    /// # Algorithm
    ///
    /// 1. Drift: a(X_n, t_n) * Δt
    /// 2. Diffusion: b(X_n, t_n) * √Δt * Z
    /// 3. Update: X_{n+1} = X_n + drift + diffusion, then apply `policy`
    ///
    /// # Parameters
    /// - `model`: SDE model providing drift and diffusion functions
    /// - `state`: Current states, one per path (modified in-place)
    /// - `t`: Current time
    /// - `dt`: Time step size
    /// - `normals`: One standard normal draw per path
    pub fn step<M: SDEModel + Sync>(
        model: &M,
        state: ArrayViewMut1<f64>,
        t: f64,
        dt: f64,
        normals: ArrayView1<f64>,
        policy: NegativePricePolicy,
    ) {
        let sqrt_dt = dt.sqrt();
        Zip::from(state).and(normals).par_for_each(|s, &z| {
            let drift_term = model.drift(*s, t) * dt;
            let diffusion_term = model.diffusion(*s, t) * sqrt_dt * z;
            *s = policy.apply(*s + drift_term + diffusion_term);
        });
    }
}

impl PathGenerator for EulerMaruyama {
    fn name(&self) -> &'static str {
        "Euler-Maruyama"
    }

    fn draws_per_path(&self, steps: usize, _layout: PathLayout) -> usize {
        steps
    }

    fn generate(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: ArrayView2<f64>,
        layout: PathLayout,
    ) -> McResult<PathBatch> {
        check_normals(self, steps, &normals, layout)?;
        let model = Gbm::risk_neutral(market);
        let dt = market.maturity() / steps as f64;
        let paths = normals.nrows();

        let mut state = Array1::from_elem(paths, market.spot());
        let mut full = match layout {
            PathLayout::TerminalOnly => None,
            PathLayout::FullPath => {
                let mut prices = Array2::zeros((paths, steps + 1));
                prices.column_mut(0).fill(market.spot());
                Some(prices)
            }
        };

        for (n, z) in normals.axis_iter(Axis(1)).enumerate() {
            Self::step(&model, state.view_mut(), n as f64 * dt, dt, z, self.policy);
            if let Some(prices) = full.as_mut() {
                prices.column_mut(n + 1).assign(&state);
            }
        }

        check_finite_prices(self.name(), state.iter())?;
        match self.policy {
            NegativePricePolicy::Allow => {
                let negative = state.iter().filter(|&&s| s < 0.0).count();
                if negative > 0 {
                    tracing::warn!(
                        negative,
                        paths,
                        steps,
                        "Euler-Maruyama produced negative terminal prices"
                    );
                }
            }
            NegativePricePolicy::Absorb => {
                let absorbed = state.iter().filter(|&&s| s == 0.0).count();
                if absorbed > 0 {
                    tracing::debug!(absorbed, paths, steps, "paths absorbed at zero");
                }
            }
        }

        Ok(match full {
            Some(prices) => PathBatch::Full(prices),
            None => PathBatch::Terminal(state),
        })
    }
}
