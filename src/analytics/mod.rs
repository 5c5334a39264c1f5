//! Closed-form reference prices.

pub mod asian_analytic;
pub mod bs_analytic;

use crate::config::MarketParameters;
use crate::error::{McError, McResult};
use crate::mc::payoffs::Payoff;
use asian_analytic::{geometric_asian_call_price, GeometricAveraging};
use bs_analytic::{bs_call_price, bs_put_price};

/// Closed-form price of `payoff` under `market`.
///
/// `steps` is the monitoring count used by the discrete geometric Asian
/// formula and ignored by the European payoffs. The strike is taken from
/// the payoff.
///
/// # Errors
/// `UnsupportedOperation` for the arithmetic Asian call, which has no closed
/// form under GBM.
pub fn reference_price(market: &MarketParameters, payoff: &Payoff, steps: usize) -> McResult<f64> {
    let (s, r, sigma, t) = (
        market.spot(),
        market.rate(),
        market.volatility(),
        market.maturity(),
    );
    match *payoff {
        Payoff::EuropeanCall { k } => bs_call_price(s, k, r, sigma, t),
        Payoff::EuropeanPut { k } => bs_put_price(s, k, r, sigma, t),
        Payoff::Straddle { k } => Ok(bs_call_price(s, k, r, sigma, t)? + bs_put_price(s, k, r, sigma, t)?),
        Payoff::AsianGeometricCall { k } => {
            geometric_asian_call_price(s, k, r, sigma, t, GeometricAveraging::Discrete { steps })
        }
        Payoff::AsianArithmeticCall { .. } => Err(McError::UnsupportedOperation {
            operation: "reference_price".to_string(),
            context: "arithmetic Asian call has no closed form under GBM".to_string(),
        }),
    }
}
