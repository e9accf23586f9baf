//! Fine-amplitude error amplification.
//!
//! Repeats the target rotation gate n times so that a small per-gate
//! rotation-angle error `d_theta` accumulates into a visible deviation of
//! the measured population from its ideal value.

use std::f64::consts::PI;

use alsvid_curve::{AnalysisOptions, CurveAnalysis, ErrorAmplificationAnalysis};
use alsvid_ir::{Circuit, ClbitId, Metadata, QubitId, StandardGate};

use crate::error::{ExpResult, ExperimentError};
use crate::experiment::Experiment;

/// A fine-amplitude experiment repeating a single-qubit rotation gate.
#[derive(Debug, Clone)]
pub struct FineAmplitude {
    qubit: u32,
    gate: StandardGate,
    angle_per_gate: f64,
    repetitions: Vec<u32>,
    options: AnalysisOptions,
}

impl FineAmplitude {
    /// Set up a fine-amplitude experiment for an arbitrary gate with a
    /// known nominal rotation angle.
    pub fn new(qubit: u32, gate: StandardGate, angle_per_gate: f64) -> Self {
        Self {
            qubit,
            gate,
            angle_per_gate,
            repetitions: (0..15).collect(),
            options: AnalysisOptions::new(),
        }
    }

    /// Fine-amplitude calibration of the `sx` gate.
    pub fn sx(qubit: u32) -> Self {
        Self::new(qubit, StandardGate::SX, PI / 2.0)
    }

    /// Fine-amplitude calibration of the `x` gate.
    pub fn x(qubit: u32) -> Self {
        Self::new(qubit, StandardGate::X, PI)
    }

    /// Scan a custom list of repetition counts.
    pub fn with_repetitions(mut self, repetitions: Vec<u32>) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Override the analysis configuration.
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

impl Experiment for FineAmplitude {
    fn experiment_type(&self) -> &'static str {
        "fine_amplitude"
    }

    fn physical_qubits(&self) -> Vec<u32> {
        vec![self.qubit]
    }

    fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        if self.repetitions.is_empty() {
            return Err(ExperimentError::EmptyScan("fine_amplitude".into()));
        }
        let qubit = QubitId(self.qubit);

        let mut circuits = Vec::with_capacity(self.repetitions.len());
        for &repetition in &self.repetitions {
            let mut circuit = Circuit::new("fine_amplitude", self.qubit + 1, 1);
            for _ in 0..repetition {
                circuit.gate(self.gate, qubit)?;
            }
            circuit.barrier_all()?;
            circuit.measure(qubit, ClbitId(0))?;
            circuit.set_metadata(Metadata::new(
                self.experiment_type(),
                [self.qubit],
                f64::from(repetition),
                "repetition number",
            ));
            circuits.push(circuit);
        }
        Ok(circuits)
    }

    fn analysis(&self) -> Box<dyn CurveAnalysis> {
        Box::new(ErrorAmplificationAnalysis::new(self.angle_per_gate, 0.0))
    }

    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        Ok(self.options.clone())
    }
}
