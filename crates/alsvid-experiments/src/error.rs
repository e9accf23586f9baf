//! Error types for the experiments crate.

use thiserror::Error;

/// Errors that can occur while generating, running, or analyzing an
/// experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExperimentError {
    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] alsvid_ir::IrError),

    /// Curve fitting failed.
    #[error(transparent)]
    Fit(#[from] alsvid_curve::FitError),

    /// Execution-boundary failure, surfaced unmodified.
    #[error(transparent)]
    Backend(#[from] alsvid_hal::HalError),

    /// Calibration-store failure.
    #[error(transparent)]
    Calibration(#[from] alsvid_cal::CalError),

    /// Invalid experiment configuration.
    #[error("Invalid experiment configuration: {0}")]
    Configuration(String),

    /// The experiment has no scan points.
    #[error("Experiment {0} produced no circuits")]
    EmptyScan(String),

    /// A circuit or result is missing required metadata.
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    /// Analysis bookkeeping failure.
    #[error("Analysis error: {0}")]
    Analysis(String),
}

/// Result type for experiment operations.
pub type ExpResult<T> = Result<T, ExperimentError>;
