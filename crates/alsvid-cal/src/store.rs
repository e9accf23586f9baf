//! Versioned calibration parameter storage.
//!
//! Parameters are keyed by (name, qubits, group). Writes append to the
//! per-key history instead of mutating it, so every update can be rolled
//! back and attributed to the experiment that produced it.
//!
//! The store is a shared resource; updates for the same key must be
//! serialized by the caller (all mutation goes through `&mut self`), the
//! store itself implements no locking.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CalError, CalResult};

/// The default calibration group.
pub const DEFAULT_GROUP: &str = "default";

/// Key identifying one calibration parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterKey {
    /// Parameter name, e.g. `"qubit_lo_freq"`.
    pub name: String,
    /// Physical qubits the parameter applies to.
    pub qubits: Vec<u32>,
    /// Group label partitioning parameter namespaces (e.g. for A/B
    /// comparison).
    pub group: String,
}

impl ParameterKey {
    /// Create a parameter key.
    pub fn new(
        name: impl Into<String>,
        qubits: impl IntoIterator<Item = u32>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
            group: group.into(),
        }
    }
}

/// One entry in a parameter's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// The stored value.
    pub value: f64,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
    /// Identity of the experiment that produced the value, for audit and
    /// undo.
    pub experiment_id: Option<String>,
}

/// In-memory calibration parameter store.
#[derive(Debug, Clone, Default)]
pub struct Calibrations {
    values: FxHashMap<ParameterKey, Vec<ParameterValue>>,
}

impl Calibrations {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current (latest) value of a parameter.
    pub fn get_parameter_value(
        &self,
        name: &str,
        qubits: &[u32],
        group: &str,
    ) -> CalResult<f64> {
        let key = ParameterKey::new(name, qubits.iter().copied(), group);
        self.values
            .get(&key)
            .and_then(|history| history.last())
            .map(|entry| entry.value)
            .ok_or_else(|| CalError::ParameterNotFound {
                name: name.to_string(),
                qubits: qubits.to_vec(),
                group: group.to_string(),
            })
    }

    /// Append a new value to a parameter's history.
    ///
    /// Existing entries are never modified; the new entry becomes current.
    pub fn add_parameter_value(
        &mut self,
        name: &str,
        qubits: &[u32],
        group: &str,
        value: f64,
        experiment_id: Option<String>,
    ) -> CalResult<()> {
        if !value.is_finite() {
            return Err(CalError::InvalidValue {
                name: name.to_string(),
                value,
            });
        }
        let key = ParameterKey::new(name, qubits.iter().copied(), group);
        info!(name, ?qubits, group, value, "calibration parameter updated");
        self.values.entry(key).or_default().push(ParameterValue {
            value,
            created_at: Utc::now(),
            experiment_id,
        });
        Ok(())
    }

    /// Full history of a parameter, oldest first.
    pub fn history(&self, name: &str, qubits: &[u32], group: &str) -> &[ParameterValue] {
        let key = ParameterKey::new(name, qubits.iter().copied(), group);
        self.values.get(&key).map_or(&[], Vec::as_slice)
    }
}
