//! Calibration updaters: turn fit results into calibration-store writes.
//!
//! Update capability is composed around a base experiment rather than
//! inherited: [`FrequencyCal`] wraps a [`RamseyXY`] scan, snapshots the
//! current calibration state into the experiment-data metadata before the
//! run, and commits the corrected value afterwards — conditionally on the
//! `auto_update` flag chosen at construction time.

use serde_json::json;
use tracing::{info, instrument};

use alsvid_cal::{Calibrations, DEFAULT_GROUP};
use alsvid_hal::Backend;

use crate::data::ExperimentData;
use crate::error::{ExpResult, ExperimentError};
use crate::ramsey::RamseyXY;
use crate::run::run_experiment;

/// Calibration parameter updated by [`FrequencyCal`].
pub const QUBIT_LO_FREQ: &str = "qubit_lo_freq";

/// Commits fitted frequencies back to the calibration store.
pub struct FrequencyUpdater;

impl FrequencyUpdater {
    /// Update the stored frequency from a completed Ramsey experiment:
    ///
    /// ```text
    ///   new = old + fitted_frequency - imparted_oscillation
    /// ```
    ///
    /// The write is attributed to the experiment-data identity for audit
    /// and undo.
    pub fn update(
        cals: &mut Calibrations,
        experiment_data: &ExperimentData,
        parameter: &str,
    ) -> ExpResult<()> {
        let old_freq = experiment_data
            .metadata_f64("cal_param_value")
            .ok_or_else(|| ExperimentError::MissingMetadata("cal_param_value".into()))?;
        let osc_freq = experiment_data
            .metadata_f64("osc_freq")
            .ok_or_else(|| ExperimentError::MissingMetadata("osc_freq".into()))?;
        let group = experiment_data
            .metadata_str("cal_group")
            .unwrap_or(DEFAULT_GROUP)
            .to_string();

        let fitted = experiment_data
            .analysis_result("Frequency")
            .and_then(|r| r.value)
            .ok_or_else(|| {
                ExperimentError::Analysis("No fitted frequency available for update".into())
            })?;

        let new_freq = old_freq + fitted.value - osc_freq;
        info!(old_freq, new_freq, "committing frequency calibration");

        cals.add_parameter_value(
            parameter,
            &experiment_data.physical_qubits,
            &group,
            new_freq,
            Some(experiment_data.experiment_id.clone()),
        )?;
        Ok(())
    }
}

/// A qubit-frequency calibration experiment based on Ramsey XY.
pub struct FrequencyCal {
    inner: RamseyXY,
    group: String,
    auto_update: bool,
}

impl FrequencyCal {
    /// Set up a frequency calibration scanning the given delays.
    ///
    /// Updates are committed automatically after a successful fit; disable
    /// with [`with_auto_update`](Self::with_auto_update).
    pub fn new(qubit: u32, delays: Vec<f64>) -> Self {
        Self {
            inner: RamseyXY::new(qubit, delays),
            group: DEFAULT_GROUP.to_string(),
            auto_update: true,
        }
    }

    /// Change the imparted oscillation frequency.
    pub fn with_osc_freq(mut self, osc_freq: f64) -> Self {
        self.inner = self.inner.with_osc_freq(osc_freq);
        self
    }

    /// Target a different calibration group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Enable or disable the automatic store write.
    ///
    /// With `false` the fit still runs; skipping the write is a
    /// configuration choice, not an error.
    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Run the Ramsey XY scan and, if enabled, commit the corrected
    /// frequency to the store.
    #[instrument(skip(self, backend, cals))]
    pub async fn run(
        &self,
        backend: &dyn Backend,
        shots: u32,
        cals: &mut Calibrations,
    ) -> ExpResult<ExperimentData> {
        use crate::experiment::Experiment;

        let qubits = self.inner.physical_qubits();
        let old_freq = cals.get_parameter_value(QUBIT_LO_FREQ, &qubits, &self.group)?;

        let mut data = run_experiment(&self.inner, backend, shots).await?;
        data.set_metadata("cal_param_value", json!(old_freq));
        data.set_metadata("cal_group", json!(self.group));
        data.set_metadata("osc_freq", json!(self.inner.osc_freq()));

        if self.auto_update {
            FrequencyUpdater::update(cals, &data, QUBIT_LO_FREQ)?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_curve::{FitValue, Quality};

    fn completed_data(old: f64, osc: f64, fitted: f64) -> ExperimentData {
        let mut data = ExperimentData::new("ramsey_xy", vec![0]);
        data.set_metadata("cal_param_value", json!(old));
        data.set_metadata("cal_group", json!("default"));
        data.set_metadata("osc_freq", json!(osc));
        data.analysis_results.push(crate::data::AnalysisResult {
            name: "Frequency".into(),
            value: Some(FitValue::new(fitted, Some(1e3))),
            unit: Some("Hz".into()),
            quality: Quality::Good,
            reduced_chisq: Some(1.0),
        });
        data
    }

    #[test]
    fn test_update_rule() {
        let mut cals = Calibrations::new();
        cals.add_parameter_value(QUBIT_LO_FREQ, &[0], "default", 5.0e9, None)
            .unwrap();

        let data = completed_data(5.0e9, 2e6, 2.5e6);
        FrequencyUpdater::update(&mut cals, &data, QUBIT_LO_FREQ).unwrap();

        let new = cals
            .get_parameter_value(QUBIT_LO_FREQ, &[0], "default")
            .unwrap();
        assert!((new - (5.0e9 + 2.5e6 - 2e6)).abs() < 1e-6);

        // The write is attributed to the experiment identity.
        let history = cals.history(QUBIT_LO_FREQ, &[0], "default");
        assert_eq!(
            history.last().unwrap().experiment_id.as_deref(),
            Some(data.experiment_id.as_str())
        );
    }

    #[test]
    fn test_update_without_fit_is_error() {
        let mut cals = Calibrations::new();
        let mut data = completed_data(5.0e9, 2e6, 2.5e6);
        data.analysis_results.clear();

        assert!(matches!(
            FrequencyUpdater::update(&mut cals, &data, QUBIT_LO_FREQ),
            Err(ExperimentError::Analysis(_))
        ));
    }
}
