//! Error types for generator setup and sampling.

use thiserror::Error;

/// Result type for generator construction.
pub type SetupResult<T> = std::result::Result<T, SetupError>;

/// Result type for drawing variates.
pub type SampleResult<T> = std::result::Result<T, SampleError>;

/// Errors raised while building intervals or the guide table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// Malformed breakpoints, transform parameters, or configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The log-density (or one of its derivatives) was not usable at `x`.
    #[error("{quantity} is not finite at x = {x} (value {value})")]
    DomainError {
        x: f64,
        quantity: &'static str,
        value: f64,
    },

    /// The rho target was not reached before hitting the interval limit.
    #[error(
        "ratio hat/squeeze = {ratio} did not reach rho = {rho} within {max_intervals} intervals"
    )]
    IntervalLimitExceeded {
        max_intervals: usize,
        rho: f64,
        ratio: f64,
    },
}

impl SetupError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a domain error for a non-finite evaluation.
    pub fn domain(x: f64, quantity: &'static str, value: f64) -> Self {
        Self::DomainError { x, quantity, value }
    }
}

/// Errors raised while drawing variates from a generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// The configured rejection cap was hit for a single variate.
    #[error("no variate accepted after {attempts} trials")]
    ExhaustedRetries { attempts: usize },
}

/// Umbrella error for callers that drive setup and sampling together.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TinflexError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}
