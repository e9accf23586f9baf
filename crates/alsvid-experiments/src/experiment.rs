//! The experiment contract and scan-unit conversion.

use alsvid_curve::{AnalysisOptions, CurveAnalysis};
use alsvid_ir::Circuit;

use crate::error::{ExpResult, ExperimentError};

/// Unit in which a delay scan is specified.
///
/// Generators convert to seconds before recording `xval`; the conversion
/// factor is kept in the analysis options so downstream consumers can
/// reverse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayUnit {
    /// Seconds (canonical).
    #[default]
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Backend sample durations; requires the backend's `dt` in seconds.
    Dt,
}

impl DelayUnit {
    /// The multiplier from this unit to seconds.
    ///
    /// `Dt` needs the backend sample duration; omitting it is a
    /// configuration error raised at circuit-generation time.
    pub fn conversion_factor(self, dt: Option<f64>) -> ExpResult<f64> {
        match self {
            DelayUnit::S => Ok(1.0),
            DelayUnit::Ms => Ok(1e-3),
            DelayUnit::Us => Ok(1e-6),
            DelayUnit::Ns => Ok(1e-9),
            DelayUnit::Dt => dt.ok_or_else(|| {
                ExperimentError::Configuration(
                    "Delays in dt units require the backend sample duration".into(),
                )
            }),
        }
    }
}

/// Contract implemented by every calibration experiment.
///
/// An experiment is a circuit generator paired with an analysis strategy;
/// the runner wires them to a backend and an [`crate::data::ExperimentData`]
/// container.
pub trait Experiment: Send + Sync {
    /// Experiment type tag recorded in circuit metadata.
    fn experiment_type(&self) -> &'static str;

    /// Physical qubits the experiment acts on.
    fn physical_qubits(&self) -> Vec<u32>;

    /// Build one circuit per scan point, metadata attached.
    fn circuits(&self) -> ExpResult<Vec<Circuit>>;

    /// The analysis strategy for this experiment.
    fn analysis(&self) -> Box<dyn CurveAnalysis>;

    /// Analysis configuration, including the scan-unit conversion factor.
    fn analysis_options(&self) -> ExpResult<AnalysisOptions> {
        Ok(AnalysisOptions::new())
    }
}
