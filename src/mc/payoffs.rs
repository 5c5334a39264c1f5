//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! ## European Options
//! - **Call**: max(S_T - K, 0)
//! - **Put**: max(K - S_T, 0)
//! - **Straddle**: call leg + put leg
//!
//! ## Path-Dependent Options
//! - **Arithmetic Asian call**: max(mean(S_0..S_N) - K, 0)
//! - **Geometric Asian call**: max(exp(mean(ln S_0..S_N)) - K, 0), the
//!   closed-form control for the arithmetic variant. A path absorbed at 0
//!   has geometric mean 0.
//!
//! # Implementation Notes
//!
//! Payoffs map a whole [`PathBatch`] to an undiscounted payoff vector.
//! Discounting is applied once, when the estimate is formed.

use crate::error::{McError, McResult};
use crate::mc::paths::{PathBatch, PathLayout};
use ndarray::{Array1, ArrayView2, Axis};

/// Per-path undiscounted payoffs, one entry per simulated path.
pub type PayoffVector = Array1<f64>;

/// Enumeration of supported option payoff types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },

    /// Long call plus long put at the same strike
    Straddle { k: f64 },

    /// Asian call on the arithmetic average of S_0..S_N
    AsianArithmeticCall { k: f64 },

    /// Asian call on the geometric average of S_0..S_N
    AsianGeometricCall { k: f64 },
}

impl Payoff {
    pub fn name(&self) -> &'static str {
        match self {
            Payoff::EuropeanCall { .. } => "European call",
            Payoff::EuropeanPut { .. } => "European put",
            Payoff::Straddle { .. } => "straddle",
            Payoff::AsianArithmeticCall { .. } => "arithmetic Asian call",
            Payoff::AsianGeometricCall { .. } => "geometric Asian call",
        }
    }

    pub fn strike(&self) -> f64 {
        match *self {
            Payoff::EuropeanCall { k }
            | Payoff::EuropeanPut { k }
            | Payoff::Straddle { k }
            | Payoff::AsianArithmeticCall { k }
            | Payoff::AsianGeometricCall { k } => k,
        }
    }

    /// Path data the simulator has to retain for this payoff.
    pub fn layout(&self) -> PathLayout {
        match self {
            Payoff::AsianArithmeticCall { .. } | Payoff::AsianGeometricCall { .. } => {
                PathLayout::FullPath
            }
            _ => PathLayout::TerminalOnly,
        }
    }

    /// Undiscounted payoff of every path in `batch`.
    ///
    /// # Errors
    /// `PayoffError` when an Asian payoff receives a terminal-only batch, or
    /// when a geometric average meets a non-positive price.
    pub fn evaluate(&self, batch: &PathBatch) -> McResult<PayoffVector> {
        match *self {
            Payoff::EuropeanCall { k } => Ok(batch.terminal()?.mapv(|s| (s - k).max(0.0))),
            Payoff::EuropeanPut { k } => Ok(batch.terminal()?.mapv(|s| (k - s).max(0.0))),
            Payoff::Straddle { k } => {
                let call = Payoff::EuropeanCall { k }.evaluate(batch)?;
                let put = Payoff::EuropeanPut { k }.evaluate(batch)?;
                Ok(call + put)
            }
            Payoff::AsianArithmeticCall { k } => {
                let path = self.full_path(batch)?;
                let average = self.mean_per_path(path.view())?;
                Ok(average.mapv(|a| (a - k).max(0.0)))
            }
            Payoff::AsianGeometricCall { k } => {
                let path = self.full_path(batch)?;
                if path.iter().any(|&s| s < 0.0) {
                    return Err(McError::PayoffError {
                        payoff_type: self.name().to_string(),
                        reason: "geometric average needs non-negative prices".to_string(),
                    });
                }
                // an absorbed path averages ln 0 = -inf, so its geometric mean is 0
                let log_average = self.mean_per_path(path.mapv(f64::ln).view())?;
                Ok(log_average.mapv(|g| (g.exp() - k).max(0.0)))
            }
        }
    }

    fn full_path<'a>(&self, batch: &'a PathBatch) -> McResult<ArrayView2<'a, f64>> {
        batch.full().ok_or_else(|| McError::PayoffError {
            payoff_type: self.name().to_string(),
            reason: "needs the full simulated path, got terminal prices only".to_string(),
        })
    }

    fn mean_per_path(&self, path: ArrayView2<f64>) -> McResult<Array1<f64>> {
        path.mean_axis(Axis(1)).ok_or_else(|| McError::PayoffError {
            payoff_type: self.name().to_string(),
            reason: "path has no monitoring points".to_string(),
        })
    }
}
