//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur when building circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A gate references a qubit outside the circuit.
    #[error("Qubit q{qubit} out of range: circuit has {num_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Number of qubits in the circuit.
        num_qubits: u32,
    },

    /// A measurement references a classical bit outside the circuit.
    #[error("Clbit c{clbit} out of range: circuit has {num_clbits} classical bits")]
    ClbitOutOfRange {
        /// The offending classical bit index.
        clbit: u32,
        /// Number of classical bits in the circuit.
        num_clbits: u32,
    },

    /// A delay with a negative or non-finite duration.
    #[error("Invalid delay duration: {0}")]
    InvalidDuration(f64),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
