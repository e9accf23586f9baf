//! Alsvid calibration parameter store
//!
//! A versioned store for calibration parameter values keyed by
//! (parameter name, qubit tuple, group label). Experiment constructors read
//! the current value to seed their schedules; calibration updaters append
//! new values after a successful fit. History is preserved for rollback.

pub mod error;
pub mod store;

pub use error::{CalError, CalResult};
pub use store::{Calibrations, ParameterKey, ParameterValue, DEFAULT_GROUP};
