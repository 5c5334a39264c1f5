// src/error.rs
use thiserror::Error;

/// Error types for the gbm-mc library
#[derive(Debug, Clone, Error)]
pub enum McError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid simulation or estimator configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Non-finite intermediate values or results
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// Payoff calculation error
    #[error("Payoff calculation error for {payoff_type}: {reason}")]
    PayoffError { payoff_type: String, reason: String },

    /// A fixed-length normal stream could not serve a request
    #[error("Random source exhausted: requested {requested} normals, {available} remaining")]
    RandomSourceExhausted { requested: usize, available: usize },

    /// Unsupported operation
    #[error("Unsupported operation '{operation}' in context: {context}")]
    UnsupportedOperation { operation: String, context: String },

    /// A convergence sweep stopped at grid point `index`
    #[error("Convergence sweep aborted at grid point {index}: {source}")]
    SweepAborted {
        index: usize,
        #[source]
        source: Box<McError>,
    },
}

/// Result type alias for gbm-mc operations
pub type McResult<T> = Result<T, McError>;

/// Validation utilities
pub mod validation {
    use super::{McError, McResult};

    /// Upper bound on simulated paths per estimate
    pub const MAX_PATHS: usize = 1_000_000_000;
    /// Upper bound on time steps per path
    pub const MAX_STEPS: usize = 100_000;
    /// Upper bound on normal draws per batch (8 GiB of f64)
    pub const MAX_DRAWS: usize = 1 << 30;

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> McResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> McResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> McResult<()> {
        if !value.is_finite() {
            Err(McError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> McResult<()> {
        if paths == 0 {
            Err(McError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > MAX_PATHS {
            Err(McError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: format!("exceeds maximum allowed ({})", MAX_PATHS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> McResult<()> {
        if steps == 0 {
            Err(McError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > MAX_STEPS {
            Err(McError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: format!("exceeds maximum allowed ({})", MAX_STEPS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a `rows × cols` draw matrix, returning its length
    pub fn validate_draws(rows: usize, cols: usize) -> McResult<usize> {
        match rows.checked_mul(cols) {
            Some(len) if len <= MAX_DRAWS => Ok(len),
            _ => Err(McError::InvalidConfiguration {
                field: "draws".to_string(),
                reason: format!(
                    "{} x {} normal draws exceeds maximum allowed ({})",
                    rows, cols, MAX_DRAWS
                ),
            }),
        }
    }

    /// Reject results that went NaN or infinite
    pub fn ensure_finite(method: &str, what: &str, value: f64) -> McResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(McError::NumericalInstability {
                method: method.to_string(),
                reason: format!("{} is not finite: {}", what, value),
            })
        }
    }
}
