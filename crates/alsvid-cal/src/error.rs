//! Error types for the calibration store.

use thiserror::Error;

/// Errors that can occur in calibration-store operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CalError {
    /// No value has been recorded for the requested parameter.
    #[error("No calibration value for {name} on qubits {qubits:?} in group {group}")]
    ParameterNotFound {
        /// Parameter name.
        name: String,
        /// Qubits the parameter is keyed on.
        qubits: Vec<u32>,
        /// Calibration group label.
        group: String,
    },

    /// A non-finite value was offered for storage.
    #[error("Invalid calibration value for {name}: {value}")]
    InvalidValue {
        /// Parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },
}

/// Result type for calibration-store operations.
pub type CalResult<T> = Result<T, CalError>;
