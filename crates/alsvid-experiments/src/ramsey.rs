//! Ramsey-type experiments: T2 Ramsey and the two-quadrature Ramsey XY.
//!
//! Both insert a scanned free evolution between two `sx` pulses and impart
//! an artificial oscillation via a delay-proportional virtual Z rotation,
//! so that small detunings show up as a beat against a known frequency.

use std::f64::consts::PI;

use serde_json::json;

use alsvid_curve::{
    AnalysisOptions, CurveAnalysis, OscillationDecayAnalysis, RamseyXyAnalysis,
};
use alsvid_ir::{Circuit, ClbitId, Metadata, QubitId};

use crate::error::ExpResult;
use crate::experiment::{DelayUnit, Experiment};

/// Default imparted oscillation frequency, in Hz.
pub const DEFAULT_OSC_FREQ: f64 = 2e6;

#[derive(Debug, Clone)]
struct RamseyScan {
    qubit: u32,
    delays: Vec<f64>,
    unit: DelayUnit,
    dt: Option<f64>,
    osc_freq: f64,
    options: AnalysisOptions,
}

impl RamseyScan {
    fn new(qubit: u32, delays: Vec<f64>) -> Self {
        Self {
            qubit,
            delays,
            unit: DelayUnit::S,
            dt: None,
            osc_freq: DEFAULT_OSC_FREQ,
            options: AnalysisOptions::new(),
        }
    }

    /// Build one Ramsey circuit: `sx — delay — rz(2π f_osc t + phase) — sx`.
    fn circuit(
        &self,
        experiment_type: &'static str,
        xval: f64,
        extra_phase: f64,
        series: Option<&str>,
    ) -> ExpResult<Circuit> {
        let qubit = QubitId(self.qubit);
        let rotation = 2.0 * PI * self.osc_freq * xval + extra_phase;

        let mut circuit = Circuit::new(experiment_type, self.qubit + 1, 1);
        circuit.sx(qubit)?;
        circuit.delay(qubit, xval)?;
        circuit.rz(rotation, qubit)?;
        circuit.sx(qubit)?;
        circuit.barrier_all()?;
        circuit.measure(qubit, ClbitId(0))?;

        let mut metadata = Metadata::new(experiment_type, [self.qubit], xval, "s")
            .with_extra("osc_freq", json!(self.osc_freq));
        if let Some(series) = series {
            metadata = metadata.with_extra("series", json!(series));
        }
        circuit.set_metadata(metadata);
        Ok(circuit)
    }
}

/// A single-quadrature T2 Ramsey experiment.
///
/// The analysis fits the decaying ground-state oscillation to extract the
/// dephasing time `T2*` and the beat frequency.
#[derive(Debug, Clone)]
pub struct T2Ramsey {
    scan: RamseyScan,
}

impl T2Ramsey {
    /// Set up a T2 Ramsey experiment scanning the given delays.
    pub fn new(qubit: u32, delays: Vec<f64>) -> Self {
        Self {
            scan: RamseyScan::new(qubit, delays),
        }
    }

    /// Interpret the delays in a different unit.
    pub fn with_unit(mut self, unit: DelayUnit) -> Self {
        self.scan.unit = unit;
        self
    }

    /// Supply the backend sample duration for `dt` scans.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.scan.dt = Some(dt);
        self
    }

    /// Change the imparted oscillation frequency.
    pub fn with_osc_freq(mut self, osc_freq: f64) -> Self {
        self.scan.osc_freq = osc_freq;
        self
    }

    /// Override the analysis configuration.
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.scan.options = options;
        self
    }
}

impl Experiment for T2Ramsey {
    fn experiment_type(&self) -> &'static str {
        "t2ramsey"
    }

    fn physical_qubits(&self) -> Vec<u32> {
        vec![self.scan.qubit]
    }

    fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        let factor = self.scan.unit.conversion_factor(self.scan.dt)?;
        self.scan
            .delays
            .iter()
            .map(|&delay| self.scan.circuit(self.experiment_type(), delay * factor, 0.0, None))
            .collect()
    }

    fn analysis(&self) -> Box<dyn CurveAnalysis> {
        Box::new(OscillationDecayAnalysis::new())
    }

    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        let factor = self.scan.unit.conversion_factor(self.scan.dt)?;
        Ok(self.scan.options.clone().with_conversion_factor(factor))
    }
}

/// A two-quadrature Ramsey experiment.
///
/// Each delay is scanned twice: the X series closes the Ramsey sequence
/// in phase with the opening pulse, the Y series a quarter period behind.
/// Fitting both series jointly resolves the sign of the detuning, which is
/// what frequency calibration needs.
#[derive(Debug, Clone)]
pub struct RamseyXY {
    scan: RamseyScan,
}

impl RamseyXY {
    /// Set up a Ramsey XY experiment scanning the given delays.
    pub fn new(qubit: u32, delays: Vec<f64>) -> Self {
        Self {
            scan: RamseyScan::new(qubit, delays),
        }
    }

    /// Interpret the delays in a different unit.
    pub fn with_unit(mut self, unit: DelayUnit) -> Self {
        self.scan.unit = unit;
        self
    }

    /// Supply the backend sample duration for `dt` scans.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.scan.dt = Some(dt);
        self
    }

    /// Change the imparted oscillation frequency.
    pub fn with_osc_freq(mut self, osc_freq: f64) -> Self {
        self.scan.osc_freq = osc_freq;
        self
    }

    /// Override the analysis configuration.
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.scan.options = options;
        self
    }

    /// The imparted oscillation frequency, in Hz.
    pub fn osc_freq(&self) -> f64 {
        self.scan.osc_freq
    }
}

impl Experiment for RamseyXY {
    fn experiment_type(&self) -> &'static str {
        "ramsey_xy"
    }

    fn physical_qubits(&self) -> Vec<u32> {
        vec![self.scan.qubit]
    }

    fn circuits(&self) -> ExpResult<Vec<Circuit>> {
        let factor = self.scan.unit.conversion_factor(self.scan.dt)?;
        let mut circuits = Vec::with_capacity(2 * self.scan.delays.len());
        for &delay in &self.scan.delays {
            let xval = delay * factor;
            circuits.push(self.scan.circuit(self.experiment_type(), xval, 0.0, Some("X"))?);
            circuits.push(self.scan.circuit(
                self.experiment_type(),
                xval,
                -PI / 2.0,
                Some("Y"),
            )?);
        }
        Ok(circuits)
    }

    fn analysis(&self) -> Box<dyn CurveAnalysis> {
        Box::new(RamseyXyAnalysis::new())
    }

    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        let factor = self.scan.unit.conversion_factor(self.scan.dt)?;
        Ok(self.scan.options.clone().with_conversion_factor(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t2ramsey_circuit_shape() {
        let exp = T2Ramsey::new(0, vec![1e-6, 2e-6]).with_osc_freq(1e6);
        let circuits = exp.circuits().unwrap();
        assert_eq!(circuits.len(), 2);

        let meta = circuits[0].metadata().unwrap();
        assert_eq!(meta.experiment_type, "t2ramsey");
        assert_eq!(meta.extra_f64("osc_freq"), Some(1e6));
        assert!(meta.extra_str("series").is_none());
    }

    #[test]
    fn test_ramsey_xy_series_tags() {
        let exp = RamseyXY::new(1, vec![1e-6]);
        let circuits = exp.circuits().unwrap();
        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[0].metadata().unwrap().extra_str("series"), Some("X"));
        assert_eq!(circuits[1].metadata().unwrap().extra_str("series"), Some("Y"));
        // Same scan point for both quadratures.
        assert_eq!(
            circuits[0].metadata().unwrap().xval,
            circuits[1].metadata().unwrap().xval
        );
    }

    #[test]
    fn test_rotation_scales_with_delay() {
        let exp = T2Ramsey::new(0, vec![1e-6]).with_osc_freq(2e6);
        let circuits = exp.circuits().unwrap();
        let angles: Vec<f64> = circuits[0]
            .instructions()
            .iter()
            .filter_map(|inst| match inst.kind {
                alsvid_ir::InstructionKind::Gate(g) => g.angle(),
                _ => None,
            })
            .collect();
        // One rz with angle 2π · 2e6 · 1e-6.
        assert_eq!(angles.len(), 1);
        assert!((angles[0] - 2.0 * PI * 2.0).abs() < 1e-12);
    }
}
