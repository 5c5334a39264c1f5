//! Convergence diagnostics for the Monte Carlo estimators.

pub mod convergence;

pub use convergence::{
    path_count_grid, step_count_grid, ConvergenceAnalyzer, ConvergencePoint, SweepPolicy,
    TrialSummary,
};
