//! Parallel composition of experiments on disjoint qubits.
//!
//! Merges the i-th circuit of each sub-experiment into one batch circuit
//! for a single execution round, then demultiplexes the outcome counts by
//! marginalizing over each sub-experiment's classical bits. Metadata
//! association is preserved through a composite entry recorded on every
//! merged circuit.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use alsvid_hal::Backend;
use alsvid_ir::{Circuit, ClbitId, Metadata};

use crate::data::{CircuitResult, ExperimentData};
use crate::error::{ExpResult, ExperimentError};
use crate::experiment::Experiment;
use crate::run::{analyze, execute_circuits};

/// Composite bookkeeping for one sub-circuit inside a merged batch.
#[derive(Debug, Serialize, Deserialize)]
struct CompositeEntry {
    /// Index of the sub-experiment.
    index: usize,
    /// Classical bits assigned to the sub-experiment in the merged circuit.
    clbits: Vec<u32>,
    /// The sub-circuit's own scan metadata.
    metadata: Metadata,
}

/// A batch of independent experiments executed in one round.
pub struct ParallelExperiment {
    experiments: Vec<Box<dyn Experiment>>,
}

impl std::fmt::Debug for ParallelExperiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExperiment")
            .field("experiments", &self.experiments.len())
            .finish()
    }
}

impl ParallelExperiment {
    /// Compose experiments over pairwise-disjoint physical qubits.
    pub fn new(experiments: Vec<Box<dyn Experiment>>) -> ExpResult<Self> {
        if experiments.is_empty() {
            return Err(ExperimentError::Configuration(
                "Parallel experiment needs at least one sub-experiment".into(),
            ));
        }
        let mut seen = FxHashSet::default();
        for exp in &experiments {
            for qubit in exp.physical_qubits() {
                if !seen.insert(qubit) {
                    return Err(ExperimentError::Configuration(format!(
                        "Qubit {qubit} is used by more than one sub-experiment"
                    )));
                }
            }
        }
        Ok(Self { experiments })
    }

    /// All physical qubits across the sub-experiments.
    pub fn physical_qubits(&self) -> Vec<u32> {
        self.experiments
            .iter()
            .flat_map(|e| e.physical_qubits())
            .collect()
    }

    /// Build the merged batch circuits.
    ///
    /// Sub-experiments may have different scan lengths; batch i contains
    /// whichever sub-circuits exist at index i.
    pub fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        let subs: Vec<Vec<Circuit>> = self
            .experiments
            .iter()
            .map(|e| e.circuits())
            .collect::<ExpResult<_>>()?;

        let batch_len = subs.iter().map(Vec::len).max().unwrap_or(0);
        let width = subs
            .iter()
            .flatten()
            .map(Circuit::num_qubits)
            .max()
            .unwrap_or(0);

        let mut merged = Vec::with_capacity(batch_len);
        for i in 0..batch_len {
            let participants: Vec<(usize, &Circuit)> = subs
                .iter()
                .enumerate()
                .filter_map(|(index, circuits)| circuits.get(i).map(|c| (index, c)))
                .collect();

            let total_clbits: u32 = participants.iter().map(|(_, c)| c.num_clbits()).sum();
            let mut circuit = Circuit::new(format!("parallel_{i}"), width, total_clbits);

            let mut entries = Vec::with_capacity(participants.len());
            let mut clbit_offset = 0u32;
            let mut batch_qubits = Vec::new();

            for (index, sub) in participants {
                for instruction in sub.instructions() {
                    let mut shifted = instruction.clone();
                    for clbit in &mut shifted.clbits {
                        *clbit = ClbitId(clbit.0 + clbit_offset);
                    }
                    circuit.push(shifted)?;
                }

                let metadata = sub.metadata().cloned().ok_or_else(|| {
                    ExperimentError::MissingMetadata(format!("sub-circuit {}", sub.name()))
                })?;
                batch_qubits.extend(metadata.qubits.iter().copied());
                entries.push(CompositeEntry {
                    index,
                    clbits: (clbit_offset..clbit_offset + sub.num_clbits()).collect(),
                    metadata,
                });
                clbit_offset += sub.num_clbits();
            }

            let composite = serde_json::to_value(&entries)
                .map_err(alsvid_hal::HalError::Serialization)?;
            circuit.set_metadata(
                Metadata::new("parallel_experiment", batch_qubits, i as f64, "index")
                    .with_extra("composite", composite),
            );
            merged.push(circuit);
        }
        Ok(merged)
    }

    /// Execute the merged batch and analyze every sub-experiment.
    ///
    /// Returns a parent container holding the merged raw results plus one
    /// child container per sub-experiment with its demultiplexed counts and
    /// analysis results.
    #[instrument(skip(self, backend))]
    pub async fn run(&self, backend: &dyn Backend, shots: u32) -> ExpResult<ExperimentData> {
        let circuits = self.circuits()?;
        if circuits.is_empty() {
            return Err(ExperimentError::EmptyScan("parallel_experiment".into()));
        }
        info!(
            sub_experiments = self.experiments.len(),
            circuits = circuits.len(),
            "running parallel batch"
        );

        let (job_ids, results) = execute_circuits(backend, &circuits, shots).await?;

        let mut parent = ExperimentData::new("parallel_experiment", self.physical_qubits());
        parent.job_ids = job_ids;

        let mut children: Vec<ExperimentData> = self
            .experiments
            .iter()
            .map(|e| ExperimentData::new(e.experiment_type(), e.physical_qubits()))
            .collect();

        for (circuit, result) in circuits.iter().zip(results) {
            let metadata = circuit
                .metadata()
                .cloned()
                .ok_or_else(|| ExperimentError::MissingMetadata(circuit.name().to_string()))?;

            let entries: Vec<CompositeEntry> = metadata
                .extra("composite")
                .cloned()
                .ok_or_else(|| ExperimentError::MissingMetadata("composite entry".into()))
                .and_then(|v| {
                    serde_json::from_value(v)
                        .map_err(|e| ExperimentError::Backend(alsvid_hal::HalError::Serialization(e)))
                })?;

            for entry in entries {
                children[entry.index].data.push(CircuitResult {
                    counts: result.counts.marginal(&entry.clbits),
                    shots: result.shots,
                    metadata: entry.metadata,
                });
            }
            parent.data.push(CircuitResult {
                counts: result.counts,
                shots: result.shots,
                metadata,
            });
        }

        for (experiment, mut child) in self.experiments.iter().zip(children) {
            analyze(experiment.as_ref(), &mut child)?;
            parent.child_data.push(child);
        }
        Ok(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t1::T1;

    #[test]
    fn test_overlapping_qubits_rejected() {
        let err = ParallelExperiment::new(vec![
            Box::new(T1::new(0, vec![1e-6])),
            Box::new(T1::new(0, vec![1e-6])),
        ])
        .unwrap_err();
        assert!(matches!(err, ExperimentError::Configuration(_)));
    }

    #[test]
    fn test_merged_circuit_layout() {
        let par = ParallelExperiment::new(vec![
            Box::new(T1::new(0, vec![1e-6, 2e-6])),
            Box::new(T1::new(2, vec![1e-6, 2e-6])),
        ])
        .unwrap();

        let circuits = par.circuits().unwrap();
        assert_eq!(circuits.len(), 2);

        let merged = &circuits[0];
        assert_eq!(merged.num_qubits(), 3);
        assert_eq!(merged.num_clbits(), 2);

        let measured = merged.measured_qubits();
        assert_eq!(measured.len(), 2);
        assert_eq!(measured[0].0 .0, 0);
        assert_eq!(measured[1].0 .0, 2);

        let meta = merged.metadata().unwrap();
        assert_eq!(meta.experiment_type, "parallel_experiment");
        assert_eq!(meta.qubits, vec![0, 2]);
        assert!(meta.extra("composite").is_some());
    }

    #[test]
    fn test_uneven_scan_lengths() {
        let par = ParallelExperiment::new(vec![
            Box::new(T1::new(0, vec![1e-6, 2e-6, 3e-6])),
            Box::new(T1::new(1, vec![1e-6])),
        ])
        .unwrap();

        let circuits = par.circuits().unwrap();
        assert_eq!(circuits.len(), 3);
        // Later batches only carry the longer scan.
        assert_eq!(circuits[0].num_clbits(), 2);
        assert_eq!(circuits[2].num_clbits(), 1);
    }
}
