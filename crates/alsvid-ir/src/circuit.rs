//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::metadata::Metadata;
use crate::qubit::{ClbitId, QubitId};

/// A calibration circuit.
///
/// An ordered sequence of gate operations on physical qubits, plus the scan
/// metadata attached by the generator. The circuit is owned by the generator
/// until handed to the execution boundary and is read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits (width).
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Ordered instruction list.
    instructions: Vec<Instruction>,
    /// Scan metadata, attached by the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

impl Circuit {
    /// Create a new empty circuit with a given width.
    pub fn new(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
            metadata: None,
        }
    }

    fn check_qubit(&self, qubit: QubitId) -> IrResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(IrError::QubitOutOfRange {
                qubit: qubit.0,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    fn check_clbit(&self, clbit: ClbitId) -> IrResult<()> {
        if clbit.0 >= self.num_clbits {
            return Err(IrError::ClbitOutOfRange {
                clbit: clbit.0,
                num_clbits: self.num_clbits,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.instructions.push(Instruction::gate(StandardGate::X, qubit));
        Ok(self)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.instructions.push(Instruction::gate(StandardGate::Y, qubit));
        Ok(self)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.instructions.push(Instruction::gate(StandardGate::SX, qubit));
        Ok(self)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.instructions
            .push(Instruction::gate(StandardGate::Rz(theta), qubit));
        Ok(self)
    }

    /// Apply a standard gate.
    pub fn gate(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.instructions.push(Instruction::gate(gate, qubit));
        Ok(self)
    }

    /// Apply a delay of `duration` seconds.
    pub fn delay(&mut self, qubit: QubitId, duration: f64) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(IrError::InvalidDuration(duration));
        }
        self.instructions.push(Instruction::delay(qubit, duration));
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.instructions.push(Instruction::barrier(qubits));
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit)?;
        self.check_clbit(clbit)?;
        self.instructions.push(Instruction::measure(qubit, clbit));
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Get the ordered instruction list.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Append an instruction verbatim.
    ///
    /// Used when merging circuits; operand indices must already be valid
    /// for this circuit's width.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        for q in &instruction.qubits {
            self.check_qubit(*q)?;
        }
        for c in &instruction.clbits {
            self.check_clbit(*c)?;
        }
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Get the scan metadata.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Attach scan metadata.
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = Some(metadata);
    }

    /// Qubits that are measured, in clbit order.
    pub fn measured_qubits(&self) -> Vec<(QubitId, ClbitId)> {
        let mut pairs: Vec<_> = self
            .instructions
            .iter()
            .filter(|inst| matches!(inst.kind, InstructionKind::Measure))
            .flat_map(|inst| inst.qubits.iter().copied().zip(inst.clbits.iter().copied()))
            .collect();
        pairs.sort_by_key(|(_, c)| c.0);
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test", 1, 1);
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 1);
        assert!(circuit.instructions().is_empty());
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::new("t1", 1, 1);
        circuit
            .x(QubitId(0))
            .unwrap()
            .delay(QubitId(0), 1e-6)
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        assert_eq!(circuit.instructions().len(), 3);
    }

    #[test]
    fn test_qubit_out_of_range() {
        let mut circuit = Circuit::new("test", 1, 1);
        let err = circuit.rz(PI, QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { qubit: 2, .. }));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let mut circuit = Circuit::new("test", 1, 0);
        assert!(matches!(
            circuit.delay(QubitId(0), -1.0),
            Err(IrError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_measured_qubits_in_clbit_order() {
        let mut circuit = Circuit::new("par", 3, 2);
        circuit.measure(QubitId(2), ClbitId(1)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let pairs = circuit.measured_qubits();
        assert_eq!(pairs, vec![(QubitId(0), ClbitId(0)), (QubitId(2), ClbitId(1))]);
    }
}
