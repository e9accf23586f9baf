//! Quantum gate types.
//!
//! The gate set is the single-qubit basis used by the calibration
//! experiments. Rotation angles are bound at circuit-generation time.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around the X axis.
    Rx(f64),
    /// Rotation around the Y axis.
    Ry(f64),
    /// Rotation around the Z axis (virtual, frame change).
    Rz(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
        }
    }

    /// Rotation angle for parametrized gates, if any.
    #[inline]
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(theta) | StandardGate::Ry(theta) | StandardGate::Rz(theta) => {
                Some(*theta)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_names() {
        assert_eq!(StandardGate::SX.name(), "sx");
        assert_eq!(StandardGate::Rz(1.0).name(), "rz");
    }

    #[test]
    fn test_gate_angle() {
        assert_eq!(StandardGate::Rz(0.5).angle(), Some(0.5));
        assert_eq!(StandardGate::X.angle(), None);
    }
}
