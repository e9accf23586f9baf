//! Half-angle characterization.
//!
//! Measures the amount by which the `sx` and `x` rotation axes are not
//! parallel. The circuits repeat `sx - sx - y` blocks inside a Ramsey-type
//! sequence:
//!
//! ```text
//!      ┌─────────┐┌────┐┌────┐┌───┐   ┌────┐┌────┐┌───┐┌────┐ ░ ┌─┐
//! q_0: ┤ Ry(π/2) ├┤ sx ├┤ sx ├┤ y ├...┤ sx ├┤ sx ├┤ y ├┤ sx ├─░─┤M├
//!      └─────────┘└────┘└────┘└───┘   └────┘└────┘└───┘└────┘ ░ └╥┘
//! ```
//!
//! The `y` gate flips the sign of the accumulated axis error each block,
//! so errors add instead of cancelling across repetitions. The opening
//! `Ry(π/2)` is decomposed as `rz(π/2) - sx - rz(-π/2)` to stay in the
//! `sx`/`rz`/`y` basis that the hardware calibrates.

use std::f64::consts::PI;

use alsvid_curve::{AnalysisOptions, CurveAnalysis, ErrorAmplificationAnalysis};
use alsvid_ir::{Circuit, ClbitId, Metadata, QubitId};

use crate::error::{ExpResult, ExperimentError};
use crate::experiment::Experiment;

/// A half-angle experiment on one qubit.
#[derive(Debug, Clone)]
pub struct HalfAngle {
    qubit: u32,
    repetitions: Vec<u32>,
    options: AnalysisOptions,
}

impl HalfAngle {
    /// Set up a half-angle experiment with the default repetition scan.
    pub fn new(qubit: u32) -> Self {
        Self {
            qubit,
            repetitions: (0..15).collect(),
            options: AnalysisOptions::new(),
        }
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

impl Experiment for HalfAngle {
    fn experiment_type(&self) -> &'static str {
        "half_angle"
    }

    fn physical_qubits(&self) -> Vec<u32> {
        vec![self.qubit]
    }

    fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        if self.repetitions.is_empty() {
            return Err(ExperimentError::EmptyScan("half_angle".into()));
        }
        let qubit = QubitId(self.qubit);

        let mut circuits = Vec::with_capacity(self.repetitions.len());
        for &repetition in &self.repetitions {
            let mut circuit = Circuit::new("half_angle", self.qubit + 1, 1);

            // Opening Ry(π/2) in the sx/rz basis.
            circuit.rz(PI / 2.0, qubit)?;
            circuit.sx(qubit)?;
            circuit.rz(-PI / 2.0, qubit)?;

            // Error amplifying sequence.
            for _ in 0..repetition {
                circuit.sx(qubit)?;
                circuit.sx(qubit)?;
                circuit.y(qubit)?;
            }

            circuit.sx(qubit)?;
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

    /// If the rotation error is very small the fit may choose a `d_theta`
    /// close to ±π; bounding it to a half period prevents that. The
    /// amplitude is pinned to one, matching the full-contrast sequence.
    fn analysis(&self) -> Box<dyn CurveAnalysis> {
        Box::new(
            ErrorAmplificationAnalysis::new(PI, -PI / 2.0).with_fixed_amp(1.0),
        )
    }

    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        Ok(self.options.clone())
    }
}
