//! Exponential decay analysis (T1 relaxation).

use crate::analysis::{apply_user_options, AnalysisOptions, CurveAnalysis};
use crate::data::SeriesData;
use crate::error::FitResult;
use crate::guess;
use crate::options::FitOptions;
use crate::result::{FitData, ParameterRepr, Quality};

/// Fit to `y = amp * exp(-x / tau) + base`.
#[derive(Debug, Clone, Default)]
pub struct DecayAnalysis {
    _private: (),
}

impl DecayAnalysis {
    /// Create a decay analysis.
    pub fn new() -> Self {
        Self::default()
    }

    fn default_fit_options(&self) -> FitOptions {
        let mut opts = FitOptions::new(["amp", "tau", "base"]);
        // Populations live in [0, 1]; leave generous room for inverted or
        // drifted signals.
        opts.set_bounds("amp", -2.0, 2.0).expect("static bounds");
        opts.set_bounds("tau", 1e-12, f64::INFINITY)
            .expect("static bounds");
        opts.set_bounds("base", -1.0, 1.0).expect("static bounds");
        opts
    }
}

impl CurveAnalysis for DecayAnalysis {
    fn name(&self) -> &'static str {
        "decay"
    }

    fn parameters(&self) -> Vec<&'static str> {
        vec!["amp", "tau", "base"]
    }

    fn model(&self, _series: usize, x: f64, params: &[f64]) -> f64 {
        let (amp, tau, base) = (params[0], params[1], params[2]);
        amp * (-x / tau).exp() + base
    }

    fn generate_guesses(
        &self,
        options: &AnalysisOptions,
        data: &[SeriesData],
    ) -> FitResult<Vec<FitOptions>> {
        let xs = data[0].xs();
        let ys = data[0].ys();

        // User tau guesses arrive in the scan's input unit.
        let mut p0 = options.p0.clone();
        if let Some(tau) = p0.get_mut("tau") {
            *tau *= options.conversion_factor;
        }

        let mut opts = apply_user_options(self.default_fit_options(), &p0, &options.bounds)?;

        let base = guess::tail_average(&ys, 0.25);
        let amp = ys.first().copied().unwrap_or(1.0) - base;
        let span = match (xs.first(), xs.last()) {
            (Some(first), Some(last)) if last > first => last - first,
            _ => 1.0,
        };
        let tau = guess::exp_decay_tau(&xs, &ys, base).unwrap_or(span);

        opts.default_guess("base", base)?;
        opts.default_guess("amp", amp)?;
        opts.default_guess("tau", tau)?;

        Ok(vec![opts])
    }

    /// A good fit has:
    /// - a reduced chi-squared lower than three
    /// - absolute amp within [0.9, 1.1]
    /// - absolute base less than 0.1
    /// - amp error less than 0.1
    /// - tau error less than its value
    /// - base error less than 0.1
    ///
    /// Absent standard errors pass automatically.
    fn evaluate_quality(&self, fit_data: &FitData) -> Quality {
        let (Some(amp), Some(tau), Some(base)) = (
            fit_data.fitval("amp"),
            fit_data.fitval("tau"),
            fit_data.fitval("base"),
        ) else {
            return Quality::Bad;
        };

        let criteria = [
            fit_data.reduced_chisq < 3.0,
            (amp.value - 1.0).abs() < 0.1,
            base.value.abs() < 0.1,
            amp.stderr.is_none_or(|err| err < 0.1),
            tau.stderr.is_none_or(|err| err < tau.value),
            base.stderr.is_none_or(|err| err < 0.1),
        ];

        if criteria.iter().all(|&c| c) {
            Quality::Good
        } else {
            Quality::Bad
        }
    }

    fn result_parameters(&self) -> Vec<ParameterRepr> {
        vec![ParameterRepr::new("tau", "T1", "s")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_fit;
    use crate::data::ProcessedPoint;
    use crate::result::FitValue;

    fn synthetic_decay(amp: f64, tau: f64, base: f64) -> SeriesData {
        let mut series = SeriesData::new("");
        for i in 0..13 {
            let x = 1e-6 + 3e-6 * i as f64;
            series.push(ProcessedPoint::new(x, amp * (-x / tau).exp() + base, 0.005));
        }
        series
    }

    #[test]
    fn test_decay_fit_without_user_guesses() {
        let data = [synthetic_decay(0.96, 25e-6, 0.02)];
        let fit = run_fit(&DecayAnalysis::new(), &data, &AnalysisOptions::new()).unwrap();

        assert!((fit.fitval("tau").unwrap().value - 25e-6).abs() < 1e-7);
        assert_eq!(
            DecayAnalysis::new().evaluate_quality(&fit),
            Quality::Good
        );
    }

    #[test]
    fn test_user_tau_guess_scaled_by_conversion_factor() {
        let analysis = DecayAnalysis::new();
        let data = [synthetic_decay(1.0, 25e-6, 0.0)];

        // tau guessed in dt units with dt = 2e-7 s.
        let options = AnalysisOptions::new()
            .with_guess("tau", 125.0)
            .unwrap()
            .with_conversion_factor(2e-7);

        let candidates = analysis.generate_guesses(&options, &data).unwrap();
        assert!((candidates[0].guess("tau").unwrap() - 25e-6).abs() < 1e-12);
    }

    #[test]
    fn test_partial_guess_merged_with_computed() {
        let analysis = DecayAnalysis::new();
        let data = [synthetic_decay(1.0, 25e-6, 0.0)];

        let options = AnalysisOptions::new().with_guess("tau", 30e-6).unwrap();
        let candidates = analysis.generate_guesses(&options, &data).unwrap();

        // User tau kept, remaining parameters computed from data.
        assert_eq!(candidates[0].guess("tau"), Some(30e-6));
        assert!((candidates[0].guess("amp").unwrap() - 1.0).abs() < 0.2);
        assert!(candidates[0].guess("base").unwrap().abs() < 0.2);
    }

    #[test]
    fn test_zero_variance_data_does_not_crash_guesses() {
        let mut series = SeriesData::new("");
        for i in 0..10 {
            series.push(ProcessedPoint::new(i as f64 * 1e-6, 0.5, 0.005));
        }
        let candidates = DecayAnalysis::new()
            .generate_guesses(&AnalysisOptions::new(), &[series])
            .unwrap();
        assert!(candidates[0].resolved_guesses().iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_quality_criteria() {
        let good = FitData::new(
            vec![
                ("amp".into(), FitValue::new(0.98, Some(0.01))),
                ("tau".into(), FitValue::new(25e-6, Some(1e-6))),
                ("base".into(), FitValue::new(0.02, Some(0.01))),
            ],
            1.1,
            10,
        );
        assert_eq!(DecayAnalysis::new().evaluate_quality(&good), Quality::Good);

        let bad_amp = FitData::new(
            vec![
                ("amp".into(), FitValue::new(0.5, Some(0.01))),
                ("tau".into(), FitValue::new(25e-6, Some(1e-6))),
                ("base".into(), FitValue::new(0.02, Some(0.01))),
            ],
            1.1,
            10,
        );
        assert_eq!(DecayAnalysis::new().evaluate_quality(&bad_amp), Quality::Bad);

        // Absent stderr is non-blocking.
        let no_stderr = FitData::new(
            vec![
                ("amp".into(), FitValue::new(0.98, None)),
                ("tau".into(), FitValue::new(25e-6, None)),
                ("base".into(), FitValue::new(0.02, None)),
            ],
            1.1,
            10,
        );
        assert_eq!(
            DecayAnalysis::new().evaluate_quality(&no_stderr),
            Quality::Good
        );
    }
}
