//! T1 relaxation experiment.
//!
//! Prepares the excited state, waits a scanned delay, and measures the
//! surviving excited-state population:
//!
//! ```text
//!      ┌───┐ ░ ┌──────────┐ ░ ┌─┐
//! q_0: ┤ X ├─░─┤ delay(t) ├─░─┤M├
//!      └───┘ ░ └──────────┘ ░ └╥┘
//! ```

use alsvid_curve::{AnalysisOptions, CurveAnalysis, DecayAnalysis};
use alsvid_ir::{Circuit, ClbitId, Metadata, QubitId};

use crate::error::ExpResult;
use crate::experiment::{DelayUnit, Experiment};

/// A T1 relaxation experiment on one qubit.
#[derive(Debug, Clone)]
pub struct T1 {
    qubit: u32,
    delays: Vec<f64>,
    unit: DelayUnit,
    dt: Option<f64>,
    options: AnalysisOptions,
}

impl T1 {
    /// Set up a T1 experiment scanning the given delays (seconds unless
    /// changed with [`with_unit`](Self::with_unit)).
    pub fn new(qubit: u32, delays: Vec<f64>) -> Self {
        Self {
            qubit,
            delays,
            unit: DelayUnit::S,
            dt: None,
            options: AnalysisOptions::new(),
        }
    }

    /// Interpret the delays in a different unit.
    pub fn with_unit(mut self, unit: DelayUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Supply the backend sample duration for `dt` scans.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Override the analysis configuration (partial guesses, bounds).
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

impl Experiment for T1 {
    fn experiment_type(&self) -> &'static str {
        "t1"
    }

    fn physical_qubits(&self) -> Vec<u32> {
        vec![self.qubit]
    }

    fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        let factor = self.unit.conversion_factor(self.dt)?;
        let qubit = QubitId(self.qubit);

        let mut circuits = Vec::with_capacity(self.delays.len());
        for &delay in &self.delays {
            let xval = delay * factor;

            let mut circuit = Circuit::new("t1", self.qubit + 1, 1);
            circuit.x(qubit)?;
            circuit.barrier_all()?;
            circuit.delay(qubit, xval)?;
            circuit.barrier_all()?;
            circuit.measure(qubit, ClbitId(0))?;
            circuit.set_metadata(Metadata::new(self.experiment_type(), [self.qubit], xval, "s"));

            circuits.push(circuit);
        }
        Ok(circuits)
    }

    fn analysis(&self) -> Box<dyn CurveAnalysis> {
        Box::new(DecayAnalysis::new())
    }

    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        let factor = self.unit.conversion_factor(self.dt)?;
        Ok(self.options.clone().with_conversion_factor(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuits_metadata() {
        let delays: Vec<f64> = (0..13).map(|i| (1 + 3 * i) as f64).collect();
        let exp = T1::new(0, delays.clone()).with_unit(DelayUnit::Ms);

        let circuits = exp.circuits().unwrap();
        assert_eq!(circuits.len(), delays.len());

        for (delay, circuit) in delays.iter().zip(&circuits) {
            let meta = circuit.metadata().unwrap();
            assert_eq!(meta.experiment_type, "t1");
            assert_eq!(meta.qubits, vec![0]);
            assert!((meta.xval - delay / 1000.0).abs() < 1e-15);
            assert_eq!(meta.unit, "s");
        }
    }

    #[test]
    fn test_dt_unit_round_trip() {
        let dt = 2e-7;
        let delays = vec![5.0, 10.0, 20.0];
        let exp = T1::new(0, delays.clone())
            .with_unit(DelayUnit::Dt)
            .with_dt(dt);

        for (delay, circuit) in delays.iter().zip(exp.circuits().unwrap()) {
            let xval = circuit.metadata().unwrap().xval;
            assert!((xval - delay * dt).abs() < 1e-18);
            // Reversing the factor recovers the original scan value.
            assert!((xval / dt - delay).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dt_unit_requires_sample_duration() {
        let exp = T1::new(0, vec![1.0]).with_unit(DelayUnit::Dt);
        assert!(exp.circuits().is_err());
    }

    #[test]
    fn test_circuit_targets_physical_qubit() {
        let exp = T1::new(2, vec![1e-6]);
        let circuits = exp.circuits().unwrap();
        assert_eq!(circuits[0].num_qubits(), 3);
        assert_eq!(circuits[0].measured_qubits(), vec![(QubitId(2), ClbitId(0))]);
    }
}
