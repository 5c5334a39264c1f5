//! Path generation schemes for risk-neutral GBM.
//!
//! Both schemes consume a dense matrix of standard normals (rows are paths)
//! and map it deterministically to a [`PathBatch`]. Keeping the draw separate
//! from the map is what lets antithetic pairing and control variates reuse
//! the same noise.

pub mod euler_maruyama;
pub mod log_space;

use crate::config::{MarketParameters, SimulationConfig};
use crate::error::{validation::validate_steps, McError, McResult};
use crate::mc::paths::{PathBatch, PathLayout};
use crate::rng::NormalSource;
use ndarray::ArrayView2;

pub use euler_maruyama::{EulerMaruyama, NegativePricePolicy};
pub use log_space::LogSpaceSampler;

/// Common contract of the path simulators.
pub trait PathGenerator {
    fn name(&self) -> &'static str;

    /// Number of normal draws each path consumes.
    fn draws_per_path(&self, steps: usize, layout: PathLayout) -> usize;

    /// Map an M × `draws_per_path` normal matrix to M paths.
    fn generate(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: ArrayView2<f64>,
        layout: PathLayout,
    ) -> McResult<PathBatch>;

    /// Draw fresh normals from `source` and generate `sim.paths` paths.
    fn simulate(
        &self,
        market: &MarketParameters,
        sim: &SimulationConfig,
        layout: PathLayout,
        source: &mut dyn NormalSource,
    ) -> McResult<PathBatch> {
        sim.validate()?;
        let normals = source.standard_normal_matrix(sim.paths, self.draws_per_path(sim.steps, layout))?;
        self.generate(market, sim.steps, normals.view(), layout)
    }
}

/// Configuration-level choice of simulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Exact sampling of the log-price
    #[default]
    LogSpace,
    /// Explicit Euler-Maruyama integration of the price SDE
    EulerMaruyama(NegativePricePolicy),
}

impl Scheme {
    pub fn euler() -> Self {
        Scheme::EulerMaruyama(NegativePricePolicy::default())
    }
}

impl PathGenerator for Scheme {
    fn name(&self) -> &'static str {
        match self {
            Scheme::LogSpace => LogSpaceSampler.name(),
            Scheme::EulerMaruyama(policy) => EulerMaruyama::new(*policy).name(),
        }
    }

    fn draws_per_path(&self, steps: usize, layout: PathLayout) -> usize {
        match self {
            Scheme::LogSpace => LogSpaceSampler.draws_per_path(steps, layout),
            Scheme::EulerMaruyama(policy) => EulerMaruyama::new(*policy).draws_per_path(steps, layout),
        }
    }

    fn generate(
        &self,
        market: &MarketParameters,
        steps: usize,
        normals: ArrayView2<f64>,
        layout: PathLayout,
    ) -> McResult<PathBatch> {
        match self {
            Scheme::LogSpace => LogSpaceSampler.generate(market, steps, normals, layout),
            Scheme::EulerMaruyama(policy) => {
                EulerMaruyama::new(*policy).generate(market, steps, normals, layout)
            }
        }
    }
}

/// Shared precondition check for `generate` implementations.
pub(crate) fn check_normals<G: PathGenerator + ?Sized>(
    generator: &G,
    steps: usize,
    normals: &ArrayView2<f64>,
    layout: PathLayout,
) -> McResult<()> {
    validate_steps(steps)?;
    if normals.nrows() == 0 {
        return Err(McError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    let expected = generator.draws_per_path(steps, layout);
    if normals.ncols() != expected {
        return Err(McError::InvalidConfiguration {
            field: "normals".to_string(),
            reason: format!(
                "{} expects {} draws per path for {} steps ({:?}), got {}",
                generator.name(),
                expected,
                steps,
                layout,
                normals.ncols()
            ),
        });
    }
    Ok(())
}

/// Reject batches containing overflowed or NaN prices.
pub(crate) fn check_finite_prices<'a, I>(method: &str, prices: I) -> McResult<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    if let Some(bad) = prices.into_iter().find(|s| !s.is_finite()) {
        return Err(McError::NumericalInstability {
            method: method.to_string(),
            reason: format!("simulated price is not finite: {}", bad),
        });
    }
    Ok(())
}
