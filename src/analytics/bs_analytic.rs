// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes formulas for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! The risk-neutral pricing formula gives:
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//!
//! # Boundary policy
//!
//! σ = 0 or T = 0 collapse the terminal distribution to a point; the
//! functions then return the deterministic discounted payoff
//! `max(S - K e^(-rT), 0)` (call) and `max(K e^(-rT) - S, 0)` (put).
//! Negative σ or T, non-positive S or K and non-finite inputs are rejected.
//! Prices are floored at that same intrinsic bound, which absorbs the
//! cancellation `S Φ(d₁) - K e^(-rT) Φ(d₂)` suffers for extreme moneyness.

use crate::error::{validation::*, McError, McResult};
use crate::math_utils::{norm_cdf, norm_pdf};

fn validate_inputs(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> McResult<()> {
    validate_positive("s0", s)?;
    validate_positive("k", k)?;
    validate_finite("r", r)?;
    validate_non_negative("sigma", sigma)?;
    validate_non_negative("t", t)?;
    Ok(())
}

/// `Some((d₁, d₂))`, or `None` when σ√T is zero and the price is deterministic.
fn d1_d2(method: &str, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> McResult<Option<(f64, f64)>> {
    let vol_sqrt_t = sigma * t.sqrt();
    if vol_sqrt_t < f64::MIN_POSITIVE {
        return Ok(None);
    }
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    if d1.is_nan() {
        return Err(McError::NumericalInstability {
            method: method.to_string(),
            reason: format!("d1 is NaN (S={}, K={}, r={}, σ={}, T={})", s, k, r, sigma, t),
        });
    }
    Ok(Some((d1, d1 - vol_sqrt_t)))
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> McResult<f64> {
    const METHOD: &str = "Black-Scholes call";
    validate_inputs(s, k, r, sigma, t)?;
    let discounted_strike = ensure_finite(METHOD, "discounted strike", k * (-r * t).exp())?;
    let lower_bound = (s - discounted_strike).max(0.0);

    match d1_d2(METHOD, s, k, r, sigma, t)? {
        Some((d1, d2)) => {
            let price = s * norm_cdf(d1) - discounted_strike * norm_cdf(d2);
            Ok(ensure_finite(METHOD, "price", price)?.max(lower_bound))
        }
        None => Ok(lower_bound),
    }
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> McResult<f64> {
    const METHOD: &str = "Black-Scholes put";
    validate_inputs(s, k, r, sigma, t)?;
    let discounted_strike = ensure_finite(METHOD, "discounted strike", k * (-r * t).exp())?;
    let lower_bound = (discounted_strike - s).max(0.0);

    match d1_d2(METHOD, s, k, r, sigma, t)? {
        Some((d1, d2)) => {
            let price = discounted_strike * norm_cdf(-d2) - s * norm_cdf(-d1);
            Ok(ensure_finite(METHOD, "price", price)?.max(lower_bound))
        }
        None => Ok(lower_bound),
    }
}

/// Black-Scholes Vega (∂V/∂σ), identical for calls and puts
///
/// # Formula
/// ```text
/// ν = S * φ(d₁) * √T
/// ```
///
/// Non-negative everywhere, which is the statement that option prices are
/// non-decreasing in volatility. Zero in the deterministic limit.
pub fn bs_call_vega(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> McResult<f64> {
    const METHOD: &str = "Black-Scholes vega";
    validate_inputs(s, k, r, sigma, t)?;
    match d1_d2(METHOD, s, k, r, sigma, t)? {
        Some((d1, _)) => ensure_finite(METHOD, "vega", s * norm_pdf(d1) * t.sqrt()),
        None => Ok(0.0),
    }
}
