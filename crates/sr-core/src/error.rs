//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so a failed severity check surfaces unchanged all
//! the way to the service facade.

use thiserror::Error;

/// Errors produced by the pure functions in `sr-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("severity {0} is outside [1, 10]")]
    InvalidSeverity(i32),

    #[error("invalid cost weights (alpha={alpha}, beta={beta}): both must be finite and >= 0")]
    InvalidWeights { alpha: f64, beta: f64 },

    #[error("unknown incident type {0:?}")]
    UnknownIncidentType(String),
}

/// Shorthand result type for `sr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
