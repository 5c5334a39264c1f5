// src/rng.rs
//! Random Number Sources for Monte Carlo Simulations
//!
//! # Design
//!
//! Every simulation receives its randomness through an explicit
//! [`NormalSource`]; nothing in the crate touches a process-wide generator.
//! 1. **Reproducibility**: same seed → same draws → bit-identical estimates
//! 2. **Independence**: [`SeededSource::split`] derives child streams for
//!    separate call sites (repeated trials, sweep points)
//! 3. **Batching**: draws are produced as a dense M × d matrix so the path
//!    schemes can run vectorised updates over the path dimension
//!
//! Draws are always generated sequentially from the stream, so the matrix
//! contents never depend on the number of rayon worker threads.

use crate::config::SimulationConfig;
use crate::error::{validation::validate_draws, McError, McResult};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Supplier of independent standard normal draws.
pub trait NormalSource {
    /// Fill `out` with N(0,1) draws.
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> McResult<()>;

    /// Draw a `rows × cols` matrix of N(0,1) values in row-major order.
    fn standard_normal_matrix(&mut self, rows: usize, cols: usize) -> McResult<Array2<f64>> {
        let len = validate_draws(rows, cols)?;
        let mut buffer = vec![0.0; len];
        self.fill_standard_normal(&mut buffer)?;
        Array2::from_shape_vec((rows, cols), buffer).map_err(|e| McError::InvalidConfiguration {
            field: "draws".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Seeded pseudo-random stream backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Unseeded stream drawn from OS entropy. Not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Seeded stream if the configuration carries a seed, entropy otherwise.
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        match cfg.seed {
            Some(seed) => Self::new(seed),
            None => {
                tracing::debug!("simulation config has no seed, drawing from OS entropy");
                Self::from_entropy()
            }
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Derive an independent child stream, advancing this one.
    pub fn split(&mut self) -> SeededSource {
        let child_seed: u64 = self.rng.gen();
        SeededSource::new(child_seed)
    }
}

impl NormalSource for SeededSource {
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> McResult<()> {
        for slot in out.iter_mut() {
            *slot = self.rng.sample(StandardNormal);
        }
        Ok(())
    }
}

/// Precomputed, finite stream of normals. Fails once the draws run out.
#[derive(Debug, Clone)]
pub struct FixedStream {
    draws: Vec<f64>,
    cursor: usize,
}

impl FixedStream {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }
}

impl NormalSource for FixedStream {
    fn fill_standard_normal(&mut self, out: &mut [f64]) -> McResult<()> {
        if out.len() > self.remaining() {
            return Err(McError::RandomSourceExhausted {
                requested: out.len(),
                available: self.remaining(),
            });
        }
        let end = self.cursor + out.len();
        out.copy_from_slice(&self.draws[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }
}
