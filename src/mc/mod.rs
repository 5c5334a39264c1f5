//! Monte Carlo estimation: path containers, payoffs and the estimator.

pub mod estimate;
pub mod mc_engine;
pub mod paths;
pub mod payoffs;
