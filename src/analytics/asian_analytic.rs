// src/analytics/asian_analytic.rs
//! Closed-form geometric average Asian call
//!
//! The geometric mean of log-normal prices is log-normal, so the option
//! reduces to a Black-Scholes-type formula on ln G:
//! ```text
//! ln G ~ N(μ_G, σ_G²)
//! μ_G  = ln S_0 + (r - σ²/2) T / 2
//! σ_G² = σ² T (2N + 1) / (6 (N + 1))   discrete, monitoring S_0..S_N
//! σ_G² = σ² T / 3                      continuous (Kemna-Vorst)
//!
//! C = e^(-rT) [ e^(μ_G + σ_G²/2) Φ(d₁) - K Φ(d₂) ]
//! d₁ = (μ_G - ln K + σ_G²) / σ_G,   d₂ = d₁ - σ_G
//! ```
//! The discrete variant averages the same N+1 points as the simulated
//! arithmetic Asian payoff, which makes it an exact control for it.

use crate::error::{validation::*, McResult};
use crate::math_utils::norm_cdf;

/// Monitoring convention of the geometric average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometricAveraging {
    /// N equally spaced steps, averaging S_0, S_dt, ..., S_T
    Discrete { steps: usize },
    /// Continuous monitoring over [0, T]
    Continuous,
}

impl GeometricAveraging {
    /// σ_G² / (σ² T)
    fn variance_fraction(self) -> McResult<f64> {
        match self {
            GeometricAveraging::Discrete { steps } => {
                validate_steps(steps)?;
                let n = steps as f64;
                Ok((2.0 * n + 1.0) / (6.0 * (n + 1.0)))
            }
            GeometricAveraging::Continuous => Ok(1.0 / 3.0),
        }
    }
}

/// Price of a geometric average Asian call.
///
/// Follows the Black-Scholes boundary policy: σ = 0 or T = 0 give the
/// discounted intrinsic value of the deterministic geometric average.
pub fn geometric_asian_call_price(
    s: f64,
    k: f64,
    r: f64,
    sigma: f64,
    t: f64,
    averaging: GeometricAveraging,
) -> McResult<f64> {
    const METHOD: &str = "geometric Asian call";
    validate_positive("s0", s)?;
    validate_positive("k", k)?;
    validate_finite("r", r)?;
    validate_non_negative("sigma", sigma)?;
    validate_non_negative("t", t)?;

    let discount = ensure_finite(METHOD, "discount factor", (-r * t).exp())?;
    let mu_g = s.ln() + 0.5 * (r - 0.5 * sigma * sigma) * t;
    let var_g = sigma * sigma * t * averaging.variance_fraction()?;
    let forward = ensure_finite(METHOD, "geometric forward", (mu_g + 0.5 * var_g).exp())?;
    let lower_bound = discount * (forward - k).max(0.0);

    let sd_g = var_g.sqrt();
    if sd_g < f64::MIN_POSITIVE {
        return Ok(lower_bound);
    }

    let d1 = (mu_g - k.ln() + var_g) / sd_g;
    let d2 = d1 - sd_g;
    let price = discount * (forward * norm_cdf(d1) - k * norm_cdf(d2));
    Ok(ensure_finite(METHOD, "price", price)?.max(lower_bound))
}
