// src/mc/paths.rs
//! Simulated path batches.
//!
//! A batch holds either the M terminal prices or the full M × (N+1) grid of
//! prices (column 0 is S0). Batches are produced per call and owned by the
//! caller; nothing is cached between estimates.

use crate::error::{McError, McResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// What a payoff needs the simulator to retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLayout {
    TerminalOnly,
    FullPath,
}

impl PathLayout {
    /// The richer of two layouts, so one batch can serve two payoffs.
    pub fn union(self, other: PathLayout) -> PathLayout {
        match (self, other) {
            (PathLayout::TerminalOnly, PathLayout::TerminalOnly) => PathLayout::TerminalOnly,
            _ => PathLayout::FullPath,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathBatch {
    /// One terminal price S_T per path
    Terminal(Array1<f64>),
    /// Rows are paths, columns are monitoring dates t_0..t_N
    Full(Array2<f64>),
}

impl PathBatch {
    pub fn paths(&self) -> usize {
        match self {
            PathBatch::Terminal(prices) => prices.len(),
            PathBatch::Full(prices) => prices.nrows(),
        }
    }

    /// Number of time steps, when the full path was retained.
    pub fn steps(&self) -> Option<usize> {
        match self {
            PathBatch::Terminal(_) => None,
            PathBatch::Full(prices) => Some(prices.ncols().saturating_sub(1)),
        }
    }

    pub fn layout(&self) -> PathLayout {
        match self {
            PathBatch::Terminal(_) => PathLayout::TerminalOnly,
            PathBatch::Full(_) => PathLayout::FullPath,
        }
    }

    /// Terminal prices S_T, one per path.
    ///
    /// Fails for a full batch without any monitoring date.
    pub fn terminal(&self) -> McResult<ArrayView1<'_, f64>> {
        match self {
            PathBatch::Terminal(prices) => Ok(prices.view()),
            PathBatch::Full(prices) => match prices.ncols().checked_sub(1) {
                Some(last) => Ok(prices.index_axis(Axis(1), last)),
                None => Err(McError::InvalidConfiguration {
                    field: "path batch".to_string(),
                    reason: "full batch has no monitoring dates".to_string(),
                }),
            },
        }
    }

    pub fn full(&self) -> Option<ArrayView2<'_, f64>> {
        match self {
            PathBatch::Terminal(_) => None,
            PathBatch::Full(prices) => Some(prices.view()),
        }
    }
}
