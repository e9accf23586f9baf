//! Error types for the curve-fitting crate.

use thiserror::Error;

/// Errors that can occur during curve fitting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FitError {
    /// Fewer data points than free parameters; no fit is attempted.
    #[error("Insufficient data: {points} points for {params} free parameters")]
    InsufficientData {
        /// Total number of data points across all series.
        points: usize,
        /// Number of free fit parameters.
        params: usize,
    },

    /// The optimizer did not converge or made no progress.
    ///
    /// Callers record the fit as bad quality rather than aborting the
    /// pipeline; partial results remain useful for diagnostics.
    #[error("Fit failed: {0}")]
    FitFailure(String),

    /// Malformed user-supplied guess or bound, rejected at configuration
    /// time.
    #[error("Invalid fit option: {0}")]
    InvalidOption(String),
}

/// Result type for curve-fitting operations.
pub type FitResult<T> = Result<T, FitError>;
