//! Scan metadata attached to generated circuits.
//!
//! Every calibration circuit carries enough metadata to reconstruct the
//! scan point it was generated for: the experiment type tag, the physical
//! qubits, the scanned x-value in canonical units, and the unit string.
//! Experiment-specific fields go into the `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a generated circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Experiment type tag, e.g. `"t1"`.
    pub experiment_type: String,
    /// Physical qubits the circuit acts on.
    pub qubits: Vec<u32>,
    /// The scanned x-value, in canonical units after conversion.
    pub xval: f64,
    /// Canonical unit of `xval`, e.g. `"s"` or `"repetition number"`.
    pub unit: String,
    /// Experiment-specific fields.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Create metadata for a scan point.
    pub fn new(
        experiment_type: impl Into<String>,
        qubits: impl IntoIterator<Item = u32>,
        xval: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            experiment_type: experiment_type.into(),
            qubits: qubits.into_iter().collect(),
            xval,
            unit: unit.into(),
            extra: Map::new(),
        }
    }

    /// Add an experiment-specific field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Look up an experiment-specific field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Look up an experiment-specific field as a float.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    /// Look up an experiment-specific field as a string.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_roundtrip() {
        let meta = Metadata::new("t1", [3], 2.5e-6, "s").with_extra("series", json!("X"));

        let encoded = serde_json::to_string(&meta).unwrap();
        let decoded: Metadata = serde_json::from_str(&encoded).unwrap();
        assert_eq!(meta, decoded);
    }

    #[test]
    fn test_extra_accessors() {
        let meta = Metadata::new("ramsey_xy", [0], 1e-6, "s")
            .with_extra("osc_freq", json!(2e6))
            .with_extra("series", json!("Y"));

        assert_eq!(meta.extra_f64("osc_freq"), Some(2e6));
        assert_eq!(meta.extra_str("series"), Some("Y"));
        assert!(meta.extra("missing").is_none());
    }
}
