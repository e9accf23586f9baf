//! Bloch-vector evolution of independent qubits.
//!
//! Calibration circuits act on each qubit independently, so a full density
//! matrix is unnecessary: three reals per qubit capture the state exactly.
//! Conventions: `|0⟩` is `(0, 0, 1)`, the excited-state population is
//! `(1 - z) / 2`, and gates rotate the vector right-handed about their
//! axis.

use std::f64::consts::PI;

use alsvid_hal::{HalError, HalResult};
use alsvid_ir::{Circuit, InstructionKind, StandardGate};

use crate::model::QubitModel;

/// Bloch vector of one qubit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlochVector {
    x: f64,
    y: f64,
    z: f64,
}

impl BlochVector {
    /// Thermal-ish initial state with a given excited-state population.
    pub(crate) fn new(excited_population: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1.0 - 2.0 * excited_population,
        }
    }

    /// Rotate right-handed about `axis` (unit vector) by `angle`.
    pub(crate) fn rotate(&mut self, axis: [f64; 3], angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let [nx, ny, nz] = axis;
        let (x, y, z) = (self.x, self.y, self.z);

        let dot = nx * x + ny * y + nz * z;
        let cross = [ny * z - nz * y, nz * x - nx * z, nx * y - ny * x];

        self.x = x * cos + cross[0] * sin + nx * dot * (1.0 - cos);
        self.y = y * cos + cross[1] * sin + ny * dot * (1.0 - cos);
        self.z = z * cos + cross[2] * sin + nz * dot * (1.0 - cos);
    }

    /// Free evolution: amplitude damping toward `|0⟩`, transverse
    /// dephasing, and frame-detuning precession about z.
    pub(crate) fn delay(&mut self, duration: f64, model: &QubitModel) {
        if model.frequency_offset != 0.0 {
            self.rotate([0.0, 0.0, 1.0], 2.0 * PI * model.frequency_offset * duration);
        }
        if let Some(t2) = model.effective_t2() {
            let gamma2 = (-duration / t2).exp();
            self.x *= gamma2;
            self.y *= gamma2;
        }
        if let Some(t1) = model.t1 {
            let gamma1 = (-duration / t1).exp();
            self.z = 1.0 - (1.0 - self.z) * gamma1;
        }
    }

    /// Excited-state population.
    pub(crate) fn excited_population(&self) -> f64 {
        (1.0 - self.z) / 2.0
    }
}

/// Apply one gate to the state, honoring the model's injected `sx` errors.
fn apply_gate(state: &mut BlochVector, gate: StandardGate, model: &QubitModel) {
    let x_axis = [1.0, 0.0, 0.0];
    let y_axis = [0.0, 1.0, 0.0];
    let z_axis = [0.0, 0.0, 1.0];
    let sx_axis = [model.sx_axis_tilt.cos(), model.sx_axis_tilt.sin(), 0.0];
    let sx_angle = PI / 2.0 + model.sx_rotation_error;

    match gate {
        StandardGate::I => {}
        StandardGate::X => state.rotate(x_axis, PI),
        StandardGate::Y => state.rotate(y_axis, PI),
        StandardGate::Z => state.rotate(z_axis, PI),
        StandardGate::SX => state.rotate(sx_axis, sx_angle),
        StandardGate::SXdg => state.rotate(sx_axis, -sx_angle),
        StandardGate::Rx(theta) => state.rotate(x_axis, theta),
        StandardGate::Ry(theta) => state.rotate(y_axis, theta),
        StandardGate::Rz(theta) => state.rotate(z_axis, theta),
    }
}

/// Evolve a circuit and return the measured-one probability per classical
/// bit, readout confusion applied.
pub(crate) fn measured_populations(
    circuit: &Circuit,
    models: &[QubitModel],
) -> HalResult<Vec<(u32, f64)>> {
    let num_qubits = circuit.num_qubits() as usize;
    if num_qubits > models.len() {
        return Err(HalError::InvalidCircuit(format!(
            "Circuit uses {} qubits but the simulator models {}",
            num_qubits,
            models.len()
        )));
    }

    let mut states: Vec<BlochVector> = models[..num_qubits]
        .iter()
        .map(|m| BlochVector::new(m.initial_excited_population))
        .collect();

    let mut measured = Vec::new();
    for instruction in circuit.instructions() {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                for qubit in &instruction.qubits {
                    let index = qubit.0 as usize;
                    apply_gate(&mut states[index], *gate, &models[index]);
                }
            }
            InstructionKind::Delay { duration } => {
                for qubit in &instruction.qubits {
                    let index = qubit.0 as usize;
                    states[index].delay(*duration, &models[index]);
                }
            }
            InstructionKind::Barrier => {}
            InstructionKind::Measure => {
                for (qubit, clbit) in instruction
                    .qubits
                    .iter()
                    .zip(instruction.clbits.iter())
                {
                    let index = qubit.0 as usize;
                    let model = &models[index];
                    let p1 = states[index].excited_population();
                    let p_meas =
                        p1 * (1.0 - model.readout_1to0) + (1.0 - p1) * model.readout_0to1;
                    measured.push((clbit.0, p_meas));
                }
            }
        }
    }
    Ok(measured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::{ClbitId, QubitId};

    #[test]
    fn test_x_gate_inverts_population() {
        let model = QubitModel::new();
        let mut state = BlochVector::new(0.0);
        apply_gate(&mut state, StandardGate::X, &model);
        assert!((state.excited_population() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_t1_decay_during_delay() {
        let model = QubitModel::new().with_t1(25e-6);
        let mut state = BlochVector::new(0.0);
        apply_gate(&mut state, StandardGate::X, &model);
        state.delay(25e-6, &model);

        let expected = (-1.0_f64).exp();
        assert!((state.excited_population() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_two_sx_equal_one_x() {
        let model = QubitModel::new();
        let mut state = BlochVector::new(0.0);
        apply_gate(&mut state, StandardGate::SX, &model);
        apply_gate(&mut state, StandardGate::SX, &model);
        assert!((state.excited_population() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ramsey_phase_accumulation() {
        // sx - delay - sx with detuning: p1 = (1 + cos(2π Δf t)) / 2.
        let detuning = 0.5e6;
        let delay = 1e-6;
        let model = QubitModel::new().with_frequency_offset(detuning);

        let mut state = BlochVector::new(0.0);
        apply_gate(&mut state, StandardGate::SX, &model);
        state.delay(delay, &model);
        apply_gate(&mut state, StandardGate::SX, &model);

        let expected = (1.0 + (2.0 * PI * detuning * delay).cos()) / 2.0;
        assert!((state.excited_population() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_readout_confusion() {
        let model = QubitModel::new().with_readout_error(0.02, 0.02);
        let mut circuit = Circuit::new("x", 1, 1);
        circuit.x(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let measured = measured_populations(&circuit, &[model]).unwrap();
        assert_eq!(measured.len(), 1);
        assert!((measured[0].1 - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_circuit_wider_than_model_rejected() {
        let circuit = Circuit::new("wide", 3, 0);
        let err = measured_populations(&circuit, &[QubitModel::new()]).unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }
}
