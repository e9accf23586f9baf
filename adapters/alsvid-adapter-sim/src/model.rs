//! Per-qubit noise and error model.

/// Physical model of one simulated qubit.
///
/// All knobs default to the ideal qubit: no decay, no detuning, perfect
/// readout, exact gates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QubitModel {
    /// Amplitude damping time in seconds, if any.
    pub t1: Option<f64>,
    /// Dephasing time in seconds. When absent but `t1` is set, the pure
    /// relaxation limit `t2 = 2 t1` applies.
    pub t2: Option<f64>,
    /// Detuning of the qubit from the drive frame, in Hz. Positive values
    /// increase the measured Ramsey frequency.
    pub frequency_offset: f64,
    /// Probability of reading `1` when the qubit is in `0`.
    pub readout_0to1: f64,
    /// Probability of reading `0` when the qubit is in `1`.
    pub readout_1to0: f64,
    /// Excited-state population before the circuit starts.
    pub initial_excited_population: f64,
    /// Rotation-angle error added to every `sx` pulse, in radians.
    pub sx_rotation_error: f64,
    /// Tilt of the `sx` rotation axis away from the x-axis, in radians,
    /// within the equatorial plane.
    pub sx_axis_tilt: f64,
}

impl Default for QubitModel {
    fn default() -> Self {
        Self {
            t1: None,
            t2: None,
            frequency_offset: 0.0,
            readout_0to1: 0.0,
            readout_1to0: 0.0,
            initial_excited_population: 0.0,
            sx_rotation_error: 0.0,
            sx_axis_tilt: 0.0,
        }
    }
}

impl QubitModel {
    /// An ideal qubit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amplitude damping time.
    pub fn with_t1(mut self, t1: f64) -> Self {
        self.t1 = Some(t1);
        self
    }

    /// Set the dephasing time.
    pub fn with_t2(mut self, t2: f64) -> Self {
        self.t2 = Some(t2);
        self
    }

    /// Set the drive-frame detuning in Hz.
    pub fn with_frequency_offset(mut self, offset: f64) -> Self {
        self.frequency_offset = offset;
        self
    }

    /// Set a symmetric readout confusion.
    pub fn with_readout_error(mut self, zero_to_one: f64, one_to_zero: f64) -> Self {
        self.readout_0to1 = zero_to_one;
        self.readout_1to0 = one_to_zero;
        self
    }

    /// Set the excited-state population before the circuit starts.
    pub fn with_initial_excited_population(mut self, population: f64) -> Self {
        self.initial_excited_population = population;
        self
    }

    /// Inject a per-pulse `sx` rotation-angle error.
    pub fn with_sx_rotation_error(mut self, error: f64) -> Self {
        self.sx_rotation_error = error;
        self
    }

    /// Tilt the `sx` rotation axis in the equatorial plane.
    pub fn with_sx_axis_tilt(mut self, tilt: f64) -> Self {
        self.sx_axis_tilt = tilt;
        self
    }

    /// Effective dephasing time, applying the pure relaxation limit.
    pub(crate) fn effective_t2(&self) -> Option<f64> {
        self.t2.or(self.t1.map(|t1| 2.0 * t1))
    }
}
