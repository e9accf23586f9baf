//! Joint two-quadrature Ramsey analysis.
//!
//! The X and Y series share every parameter; the Y series trails the X
//! series by a quarter period, which resolves the sign of the detuning that
//! a single-quadrature Ramsey cannot distinguish.

use std::f64::consts::PI;

use crate::analysis::{apply_user_options, AnalysisOptions, CurveAnalysis};
use crate::data::SeriesData;
use crate::error::FitResult;
use crate::guess;
use crate::options::FitOptions;
use crate::result::{FitData, ParameterRepr, Quality};

/// Joint fit of
///
/// ```text
///   y_X = amp * exp(-x / tau) * cos(2π freq x + phase) + base
///   y_Y = amp * exp(-x / tau) * sin(2π freq x + phase) + base
/// ```
///
/// with `freq` signed.
#[derive(Debug, Clone, Default)]
pub struct RamseyXyAnalysis {
    _private: (),
}

impl RamseyXyAnalysis {
    /// Create a Ramsey XY analysis.
    pub fn new() -> Self {
        Self::default()
    }

    fn default_fit_options(&self) -> FitOptions {
        let mut opts = FitOptions::new(["amp", "tau", "freq", "phase", "base"]);
        opts.set_bounds("amp", -2.0, 2.0).expect("static bounds");
        opts.set_bounds("tau", 1e-12, f64::INFINITY)
            .expect("static bounds");
        opts.set_bounds("phase", -PI, PI).expect("static bounds");
        opts.set_bounds("base", -2.0, 2.0).expect("static bounds");
        opts
    }
}

impl CurveAnalysis for RamseyXyAnalysis {
    fn name(&self) -> &'static str {
        "ramsey_xy"
    }

    fn parameters(&self) -> Vec<&'static str> {
        vec!["amp", "tau", "freq", "phase", "base"]
    }

    fn series_count(&self) -> usize {
        2
    }

    fn series_names(&self) -> Vec<&'static str> {
        vec!["X", "Y"]
    }

    fn model(&self, series: usize, x: f64, params: &[f64]) -> f64 {
        let (amp, tau, freq, phase, base) =
            (params[0], params[1], params[2], params[3], params[4]);
        let envelope = amp * (-x / tau).exp();
        let angle = 2.0 * PI * freq * x + phase;
        match series {
            0 => envelope * angle.cos() + base,
            _ => envelope * angle.sin() + base,
        }
    }

    fn generate_guesses(
        &self,
        options: &AnalysisOptions,
        data: &[SeriesData],
    ) -> FitResult<Vec<FitOptions>> {
        let xs = data[0].xs();
        let ys_x = data[0].ys();

        let mut p0 = options.p0.clone();
        if let Some(tau) = p0.get_mut("tau") {
            *tau *= options.conversion_factor;
        }

        let seeded = apply_user_options(self.default_fit_options(), &p0, &options.bounds)?;

        let span = match (xs.first(), xs.last()) {
            (Some(first), Some(last)) if last > first => last - first,
            _ => 1.0,
        };
        let base = guess::constant_sinusoidal_offset(&ys_x);
        let amp = guess::oscillation_amplitude(&ys_x);
        let freq_magnitude = guess::frequency(&xs, &ys_x).unwrap_or(1.0 / span);

        // The periodogram cannot tell the detuning sign; seed both and let
        // the joint fit decide from the Y quadrature.
        let freqs: Vec<f64> = match seeded.guess("freq") {
            Some(freq) => vec![freq],
            None => vec![freq_magnitude, -freq_magnitude],
        };

        let mut candidates = Vec::with_capacity(freqs.len());
        for freq in freqs {
            let mut opts = seeded.clone();
            opts.default_guess("base", base)?;
            opts.default_guess("amp", amp)?;
            opts.default_guess("freq", freq)?;
            opts.default_guess("tau", span)?;
            opts.default_guess("phase", 0.0)?;
            candidates.push(opts);
        }
        Ok(candidates)
    }

    /// Quality criteria match the damped-oscillation analysis: reduced
    /// chi-squared below three and relative errors of amp, tau, and freq
    /// below 10 percent.
    fn evaluate_quality(&self, fit_data: &FitData) -> Quality {
        let (Some(amp), Some(tau), Some(freq)) = (
            fit_data.fitval("amp"),
            fit_data.fitval("tau"),
            fit_data.fitval("freq"),
        ) else {
            return Quality::Bad;
        };

        let relative_ok = |v: crate::result::FitValue| match v.stderr {
            None => true,
            Some(err) => err < 0.1 * v.value.abs(),
        };

        let criteria = [
            fit_data.reduced_chisq < 3.0,
            relative_ok(amp),
            relative_ok(tau),
            relative_ok(freq),
        ];

        if criteria.iter().all(|&c| c) {
            Quality::Good
        } else {
            Quality::Bad
        }
    }

    fn result_parameters(&self) -> Vec<ParameterRepr> {
        vec![ParameterRepr::new("freq", "Frequency", "Hz")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_fit;
    use crate::data::ProcessedPoint;

    fn synthetic_xy(amp: f64, tau: f64, freq: f64, base: f64) -> [SeriesData; 2] {
        let mut x_series = SeriesData::new("X");
        let mut y_series = SeriesData::new("Y");
        for i in 0..40 {
            let x = i as f64 * 50e-9;
            let envelope = amp * (-x / tau).exp();
            let angle = 2.0 * PI * freq * x;
            x_series.push(ProcessedPoint::new(x, envelope * angle.cos() + base, 0.005));
            y_series.push(ProcessedPoint::new(x, envelope * angle.sin() + base, 0.005));
        }
        [x_series, y_series]
    }

    #[test]
    fn test_positive_detuning_recovered() {
        let data = synthetic_xy(0.5, 20e-6, 2.0e6, 0.5);
        let fit = run_fit(&RamseyXyAnalysis::new(), &data, &AnalysisOptions::new()).unwrap();
        assert!((fit.fitval("freq").unwrap().value - 2.0e6).abs() < 1e4);
    }

    #[test]
    fn test_negative_detuning_recovered() {
        // The Y quadrature flips sign; the joint fit must land on -freq.
        let data = synthetic_xy(0.5, 20e-6, -2.0e6, 0.5);
        let fit = run_fit(&RamseyXyAnalysis::new(), &data, &AnalysisOptions::new()).unwrap();
        assert!((fit.fitval("freq").unwrap().value + 2.0e6).abs() < 1e4);
    }
}
