// src/solvers/log_space.rs
//! Exact log-space sampler for GBM
//!
//! The log-price increments of GBM are Gaussian, so
//! ```text
//! ln S_T = ln S_0 + Σ_{i=1}^{N} [(r - σ²/2) dt + σ √dt Z_i]
//! ```
//! has the same law as `ln S_0 + (r - σ²/2) T + σ √T Z` for a single Z.
//! Terminal-only batches therefore use one draw per path whatever N is; the
//! N-step recursion is only run when intermediate prices are needed.
//! There is no discretisation bias at any N.

use super::{check_finite_prices, check_normals, PathGenerator};
use crate::config::MarketParameters;
use crate::error::McResult;
use crate::mc::paths::{PathBatch, PathLayout};
use crate::models::gbm::Gbm;
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpaceSampler;

impl PathGenerator for LogSpaceSampler {
    fn name(&self) -> &'static str {
        "log-space exact"
    }

    fn draws_per_path(&self, steps: usize, layout: PathLayout) -> usize {
        match layout {
            PathLayout::TerminalOnly => 1,
            PathLayout::FullPath => steps,
        }
    }

    fn generate(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: ArrayView2<f64>,
        layout: PathLayout,
    ) -> McResult<PathBatch> {
        check_normals(self, steps, &normals, layout)?;
        let gbm = Gbm::risk_neutral(market);

        let batch = match layout {
            PathLayout::TerminalOnly => {
                let t = market.maturity();
                let mut terminal = Array1::zeros(normals.nrows());
                Zip::from(&mut terminal)
                    .and(normals.index_axis(Axis(1), 0))
                    .par_for_each(|s, &z| *s = gbm.exact_step(gbm.s0, t, z));
                PathBatch::Terminal(terminal)
            }
            PathLayout::FullPath => {
                let dt = market.maturity() / steps as f64;
                let drift = gbm.log_drift(dt);
                let vol = gbm.log_vol(dt);
                let log_s0 = gbm.s0.ln();

                let mut prices = Array2::zeros((normals.nrows(), steps + 1));
                Zip::from(prices.rows_mut())
                    .and(normals.rows())
                    .par_for_each(|mut row, z| {
                        row[0] = gbm.s0;
                        let mut log_s = log_s0;
                        for (slot, &dz) in row.iter_mut().skip(1).zip(z.iter()) {
                            log_s += drift + vol * dz;
                            *slot = log_s.exp();
                        }
                    });
                PathBatch::Full(prices)
            }
        };

        match &batch {
            PathBatch::Terminal(prices) => check_finite_prices(self.name(), prices.iter())?,
            PathBatch::Full(prices) => check_finite_prices(self.name(), prices.iter())?,
        }
        Ok(batch)
    }
}
