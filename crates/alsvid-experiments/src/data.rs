//! The generic experiment-data container.
//!
//! Stores everything one experiment run produces: the raw per-circuit
//! counts with echoed scan metadata, the job identifiers from the execution
//! boundary, the named analysis results with quality labels, and — for
//! parallel batches — per-sub-experiment child containers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use alsvid_curve::{FitValue, Quality};
use alsvid_hal::{Counts, JobId};
use alsvid_ir::Metadata;

/// Raw result for one executed circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitResult {
    /// Outcome counts.
    pub counts: Counts,
    /// Shots executed for this circuit.
    pub shots: u32,
    /// The scan metadata echoed from the generated circuit.
    pub metadata: Metadata,
}

/// One named analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// User-facing result name, e.g. `"T1"`.
    pub name: String,
    /// Fitted value with standard error; absent when the fit failed.
    pub value: Option<FitValue>,
    /// Unit of the value, if any.
    pub unit: Option<String>,
    /// Algorithmic quality label.
    pub quality: Quality,
    /// Reduced chi-squared of the underlying fit, when one converged.
    pub reduced_chisq: Option<f64>,
}

/// Container for raw results and analysis output of one experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentData {
    /// Unique identity of this run, used for calibration attribution.
    pub experiment_id: String,
    /// Experiment type tag.
    pub experiment_type: String,
    /// Physical qubits of the experiment.
    pub physical_qubits: Vec<u32>,
    /// Free-form run metadata (e.g. calibration snapshot values).
    pub metadata: Map<String, Value>,
    /// Job identifiers from the execution boundary.
    pub job_ids: Vec<JobId>,
    /// Raw per-circuit results.
    pub data: Vec<CircuitResult>,
    /// Named analysis results.
    pub analysis_results: Vec<AnalysisResult>,
    /// Per-sub-experiment results of a parallel batch.
    pub child_data: Vec<ExperimentData>,
}

impl ExperimentData {
    /// Create an empty container for an experiment.
    pub fn new(experiment_type: impl Into<String>, physical_qubits: Vec<u32>) -> Self {
        Self {
            experiment_id: Uuid::new_v4().to_string(),
            experiment_type: experiment_type.into(),
            physical_qubits,
            metadata: Map::new(),
            job_ids: vec![],
            data: vec![],
            analysis_results: vec![],
            child_data: vec![],
        }
    }

    /// Look up an analysis result by name.
    pub fn analysis_result(&self, name: &str) -> Option<&AnalysisResult> {
        self.analysis_results.iter().find(|r| r.name == name)
    }

    /// Child container of a parallel batch.
    pub fn child(&self, index: usize) -> Option<&ExperimentData> {
        self.child_data.get(index)
    }

    /// Attach a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Read a metadata entry as a float.
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(Value::as_f64)
    }

    /// Read a metadata entry as a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
