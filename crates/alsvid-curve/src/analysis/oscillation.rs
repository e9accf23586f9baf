//! Damped oscillation analysis (T2 Ramsey).

use std::f64::consts::PI;

use crate::analysis::{apply_user_options, AnalysisOptions, CurveAnalysis};
use crate::data::SeriesData;
use crate::error::FitResult;
use crate::guess;
use crate::options::FitOptions;
use crate::result::{FitData, ParameterRepr, Quality};

/// Fit to `y = amp * exp(-x / tau) * cos(2π freq x + phase) + base`.
#[derive(Debug, Clone, Default)]
pub struct OscillationDecayAnalysis {
    _private: (),
}

impl OscillationDecayAnalysis {
    /// Create a damped-oscillation analysis.
    pub fn new() -> Self {
        Self::default()
    }

    fn default_fit_options(&self) -> FitOptions {
        let mut opts = FitOptions::new(["amp", "tau", "freq", "phase", "base"]);
        opts.set_bounds("amp", -2.0, 2.0).expect("static bounds");
        opts.set_bounds("tau", 1e-12, f64::INFINITY)
            .expect("static bounds");
        opts.set_bounds("freq", 0.0, f64::INFINITY)
            .expect("static bounds");
        opts.set_bounds("phase", -PI, PI).expect("static bounds");
        opts.set_bounds("base", -2.0, 2.0).expect("static bounds");
        opts
    }
}

impl CurveAnalysis for OscillationDecayAnalysis {
    fn name(&self) -> &'static str {
        "oscillation_decay"
    }

    fn parameters(&self) -> Vec<&'static str> {
        vec!["amp", "tau", "freq", "phase", "base"]
    }

    fn model(&self, _series: usize, x: f64, params: &[f64]) -> f64 {
        let (amp, tau, freq, phase, base) =
            (params[0], params[1], params[2], params[3], params[4]);
        amp * (-x / tau).exp() * (2.0 * PI * freq * x + phase).cos() + base
    }

    /// Ramsey experiments project the ground-state population.
    fn outcome(&self) -> &'static str {
        "0"
    }

    fn generate_guesses(
        &self,
        options: &AnalysisOptions,
        data: &[SeriesData],
    ) -> FitResult<Vec<FitOptions>> {
        let xs = data[0].xs();
        let ys = data[0].ys();

        let mut p0 = options.p0.clone();
        if let Some(tau) = p0.get_mut("tau") {
            *tau *= options.conversion_factor;
        }

        let seeded = apply_user_options(self.default_fit_options(), &p0, &options.bounds)?;

        let span = match (xs.first(), xs.last()) {
            (Some(first), Some(last)) if last > first => last - first,
            _ => 1.0,
        };
        let base = guess::constant_sinusoidal_offset(&ys);
        let amp = guess::oscillation_amplitude(&ys);
        let freq = guess::frequency(&xs, &ys).unwrap_or(1.0 / span);

        // Without a user phase, multi-start over a quarter-period grid; the
        // best reduced chi-squared wins downstream.
        let phases: Vec<f64> = match seeded.guess("phase") {
            Some(phase) => vec![phase],
            None => vec![0.0, PI / 2.0, -PI / 2.0, PI],
        };

        let mut candidates = Vec::with_capacity(phases.len());
        for phase in phases {
            let mut opts = seeded.clone();
            opts.default_guess("base", base)?;
            opts.default_guess("amp", amp)?;
            opts.default_guess("freq", freq)?;
            opts.default_guess("tau", span)?;
            opts.default_guess("phase", phase)?;
            candidates.push(opts);
        }
        Ok(candidates)
    }

    /// A good fit has:
    /// - a reduced chi-squared lower than three
    /// - relative error of amp less than 10 percent
    /// - relative error of tau less than 10 percent
    /// - relative error of freq less than 10 percent
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
        vec![
            ParameterRepr::new("freq", "Frequency", "Hz"),
            ParameterRepr::new("tau", "T2star", "s"),
        ]
    }
}
