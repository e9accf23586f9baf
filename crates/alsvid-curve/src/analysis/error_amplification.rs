//! Error-amplification analysis for the fine-amplitude family.
//!
//! Shared by the fine-amplitude, half-angle, and drag-style experiments:
//! each repetition of the amplifying block adds `angle_per_gate + d_theta`
//! to the accumulated rotation, so a small per-gate error shows up as a
//! slow oscillation across the repetition scan.

use std::f64::consts::PI;

use crate::analysis::{apply_user_options, AnalysisOptions, CurveAnalysis};
use crate::data::SeriesData;
use crate::error::FitResult;
use crate::guess;
use crate::options::FitOptions;
use crate::result::{FitData, ParameterRepr, Quality};

/// Fit to `y = amp / 2 * (1 - cos((angle_per_gate + d_theta) x + phase_offset)) + base`.
///
/// `angle_per_gate` and `phase_offset` are fixed by the experiment;
/// `d_theta` is the parameter of interest. If the rotation error is very
/// small the optimizer can land on a `d_theta` a full period away, so the
/// parameter is bounded to a half-period window around zero. The window is
/// a policy knob ([`with_angle_bound`](Self::with_angle_bound)), not a
/// hard-coded constant.
#[derive(Debug, Clone)]
pub struct ErrorAmplificationAnalysis {
    angle_per_gate: f64,
    phase_offset: f64,
    angle_bound: f64,
    fixed_amp: Option<f64>,
}

impl ErrorAmplificationAnalysis {
    /// Create an analysis for a given nominal per-repetition angle and
    /// phase offset.
    pub fn new(angle_per_gate: f64, phase_offset: f64) -> Self {
        Self {
            angle_per_gate,
            phase_offset,
            angle_bound: PI / 2.0,
            fixed_amp: None,
        }
    }

    /// Widen or narrow the `d_theta` search window.
    pub fn with_angle_bound(mut self, bound: f64) -> Self {
        self.angle_bound = bound;
        self
    }

    /// Fix the oscillation amplitude instead of fitting it.
    pub fn with_fixed_amp(mut self, amp: f64) -> Self {
        self.fixed_amp = Some(amp);
        self
    }

    /// The nominal per-repetition rotation angle.
    pub fn angle_per_gate(&self) -> f64 {
        self.angle_per_gate
    }

    /// The angle bound is caller-supplied policy, so building the seed can
    /// fail with `InvalidOption` instead of being statically valid.
    fn default_fit_options(&self) -> FitResult<FitOptions> {
        let mut opts = FitOptions::new(self.parameters());
        opts.set_bounds("d_theta", -self.angle_bound, self.angle_bound)?;
        if self.fixed_amp.is_none() {
            opts.set_bounds("amp", -2.0, 2.0)?;
        }
        opts.set_bounds("base", -1.0, 1.0)?;
        Ok(opts)
    }

    fn unpack(&self, params: &[f64]) -> (f64, f64, f64) {
        match self.fixed_amp {
            Some(amp) => (params[0], amp, params[1]),
            None => (params[0], params[1], params[2]),
        }
    }
}

impl CurveAnalysis for ErrorAmplificationAnalysis {
    fn name(&self) -> &'static str {
        "error_amplification"
    }

    fn parameters(&self) -> Vec<&'static str> {
        if self.fixed_amp.is_some() {
            vec!["d_theta", "base"]
        } else {
            vec!["d_theta", "amp", "base"]
        }
    }

    fn model(&self, _series: usize, x: f64, params: &[f64]) -> f64 {
        let (d_theta, amp, base) = self.unpack(params);
        let angle = (self.angle_per_gate + d_theta) * x + self.phase_offset;
        amp / 2.0 * (1.0 - angle.cos()) + base
    }

    fn generate_guesses(
        &self,
        options: &AnalysisOptions,
        data: &[SeriesData],
    ) -> FitResult<Vec<FitOptions>> {
        let ys = data[0].ys();
        let seeded = apply_user_options(self.default_fit_options()?, &options.p0, &options.bounds)?;

        // Mean ≈ amp/2 + base over whole periods of the oscillation.
        let amp = 2.0 * guess::oscillation_amplitude(&ys);
        let mean = if ys.is_empty() {
            0.5
        } else {
            ys.iter().sum::<f64>() / ys.len() as f64
        };
        let base = mean - self.fixed_amp.unwrap_or(amp) / 2.0;

        // Multi-start around zero error to escape the flat gradient when
        // the true error is sizable.
        let d_thetas: Vec<f64> = match seeded.guess("d_theta") {
            Some(d) => vec![d],
            None => vec![0.0, self.angle_bound / 2.0, -self.angle_bound / 2.0],
        };

        let mut candidates = Vec::with_capacity(d_thetas.len());
        for d_theta in d_thetas {
            let mut opts = seeded.clone();
            opts.default_guess("d_theta", d_theta)?;
            if self.fixed_amp.is_none() {
                opts.default_guess("amp", amp)?;
            }
            opts.default_guess("base", base)?;
            candidates.push(opts);
        }
        Ok(candidates)
    }

    /// A good fit has a reduced chi-squared below three and a `d_theta`
    /// standard error that is absent or below the per-gate angle.
    fn evaluate_quality(&self, fit_data: &FitData) -> Quality {
        let Some(d_theta) = fit_data.fitval("d_theta") else {
            return Quality::Bad;
        };

        let criteria = [
            fit_data.reduced_chisq < 3.0,
            d_theta.stderr.is_none_or(|err| err < self.angle_per_gate),
        ];

        if criteria.iter().all(|&c| c) {
            Quality::Good
        } else {
            Quality::Bad
        }
    }

    fn result_parameters(&self) -> Vec<ParameterRepr> {
        vec![ParameterRepr::new("d_theta", "d_theta", "rad")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_fit;
    use crate::data::ProcessedPoint;

    fn synthetic_scan(angle_per_gate: f64, d_theta: f64, phase_offset: f64) -> SeriesData {
        let mut series = SeriesData::new("");
        for n in 0..15 {
            let x = n as f64;
            let angle = (angle_per_gate + d_theta) * x + phase_offset;
            series.push(ProcessedPoint::new(x, 0.5 * (1.0 - angle.cos()), 0.005));
        }
        series
    }

    #[test]
    fn test_fine_amplitude_error_recovered() {
        let analysis = ErrorAmplificationAnalysis::new(PI / 2.0, 0.0);
        let data = [synthetic_scan(PI / 2.0, 0.03, 0.0)];

        let fit = run_fit(&analysis, &data, &AnalysisOptions::new()).unwrap();
        assert!((fit.fitval("d_theta").unwrap().value - 0.03).abs() < 1e-4);
        assert_eq!(analysis.evaluate_quality(&fit), Quality::Good);
    }

    #[test]
    fn test_fixed_amp_reduces_free_parameters() {
        let analysis = ErrorAmplificationAnalysis::new(PI, -PI / 2.0).with_fixed_amp(1.0);
        assert_eq!(analysis.parameters(), vec!["d_theta", "base"]);

        let data = [synthetic_scan(PI, 0.05, -PI / 2.0)];
        let fit = run_fit(&analysis, &data, &AnalysisOptions::new()).unwrap();
        assert!((fit.fitval("d_theta").unwrap().value - 0.05).abs() < 1e-3);
    }

    #[test]
    fn test_angle_bound_policy_is_configurable() {
        let analysis = ErrorAmplificationAnalysis::new(PI / 2.0, 0.0).with_angle_bound(PI / 8.0);
        let candidates = analysis
            .generate_guesses(&AnalysisOptions::new(), &[synthetic_scan(PI / 2.0, 0.0, 0.0)])
            .unwrap();
        let hint = candidates[0].hint("d_theta").unwrap();
        assert_eq!(hint.bounds, (-PI / 8.0, PI / 8.0));
    }
}
