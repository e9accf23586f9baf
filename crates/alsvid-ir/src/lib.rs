//! Alsvid circuit representation
//!
//! A minimal circuit container for calibration experiments: an ordered
//! sequence of single-qubit gate operations with attached scan metadata.
//!
//! Calibration circuits are strictly linear, so unlike a general compiler IR
//! there is no DAG here — generators append instructions in execution order
//! and the execution boundary consumes them the same way.
//!
//! # Example
//!
//! ```
//! use alsvid_ir::{Circuit, Metadata, QubitId, ClbitId};
//!
//! let mut circuit = Circuit::new("t1", 1, 1);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.delay(QubitId(0), 5e-6).unwrap();
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//! circuit.set_metadata(Metadata::new("t1", [0], 5e-6, "s"));
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod metadata;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use metadata::Metadata;
pub use qubit::{ClbitId, QubitId};
