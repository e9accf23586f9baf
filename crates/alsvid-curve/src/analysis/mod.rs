//! Analysis strategies: per-experiment fit models, guesses, and quality
//! rules behind a common polymorphic contract.
//!
//! Each strategy implements [`CurveAnalysis`]: it declares its free
//! parameters and series layout, evaluates the model, turns processed data
//! plus user overrides into one or more candidate seeds, and judges the
//! resulting fit. Strategies are selected at experiment-construction time
//! and hold no mutable state.

mod decay;
mod error_amplification;
mod oscillation;
mod ramsey_xy;

pub use decay::DecayAnalysis;
pub use error_amplification::ErrorAmplificationAnalysis;
pub use oscillation::OscillationDecayAnalysis;
pub use ramsey_xy::RamseyXyAnalysis;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::data::SeriesData;
use crate::error::{FitError, FitResult};
use crate::fitter::fit_any;
use crate::options::FitOptions;
use crate::result::{FitData, ParameterRepr, Quality};

/// User-facing analysis configuration.
///
/// An immutable value passed into the fit call; recognized fields are the
/// partial initial guesses `p0`, bound overrides, the scan-unit conversion
/// factor, and an optional override of the projected measurement outcome.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Partial user guesses, merged with strategy-computed guesses.
    pub p0: FxHashMap<String, f64>,
    /// Bound overrides applied on top of the strategy defaults.
    pub bounds: FxHashMap<String, (f64, f64)>,
    /// Multiplier from the scan's input unit to canonical units; strategies
    /// apply it to user-supplied guesses of time-like parameters.
    pub conversion_factor: f64,
    /// Measurement outcome to project into y-values, overriding the
    /// strategy default.
    pub outcome: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            p0: FxHashMap::default(),
            bounds: FxHashMap::default(),
            conversion_factor: 1.0,
            outcome: None,
        }
    }
}

impl AnalysisOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply an initial guess for one parameter.
    ///
    /// Non-finite guesses are rejected immediately.
    pub fn with_guess(mut self, name: impl Into<String>, value: f64) -> FitResult<Self> {
        let name = name.into();
        if !value.is_finite() {
            return Err(FitError::InvalidOption(format!(
                "Guess for {name} is not finite: {value}"
            )));
        }
        self.p0.insert(name, value);
        Ok(self)
    }

    /// Override the bounds for one parameter.
    pub fn with_bounds(
        mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> FitResult<Self> {
        let name = name.into();
        if lower.is_nan() || upper.is_nan() || lower >= upper {
            return Err(FitError::InvalidOption(format!(
                "Invalid bounds for {name}: [{lower}, {upper}]"
            )));
        }
        self.bounds.insert(name, (lower, upper));
        Ok(self)
    }

    /// Set the scan-unit conversion factor.
    pub fn with_conversion_factor(mut self, factor: f64) -> Self {
        self.conversion_factor = factor;
        self
    }

    /// Override the projected measurement outcome.
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }
}

/// Common contract implemented by every analysis strategy.
pub trait CurveAnalysis: Send + Sync {
    /// Strategy name, used for logging and result attribution.
    fn name(&self) -> &'static str;

    /// Free fit parameters, in fit order.
    fn parameters(&self) -> Vec<&'static str>;

    /// Number of data series the model expects.
    fn series_count(&self) -> usize {
        1
    }

    /// Metadata series tags, in model order. Single-series strategies use
    /// one unnamed series.
    fn series_names(&self) -> Vec<&'static str> {
        vec![""]
    }

    /// Evaluate the model for a series at x with the given parameters.
    fn model(&self, series: usize, x: f64, params: &[f64]) -> f64;

    /// Measurement outcome whose population becomes the y-value.
    fn outcome(&self) -> &'static str {
        "1"
    }

    /// Build candidate fit seeds from the processed data and user options.
    ///
    /// User-supplied partial guesses are merged with computed guesses for
    /// the remaining parameters; they never discard the computed set.
    fn generate_guesses(
        &self,
        options: &AnalysisOptions,
        data: &[SeriesData],
    ) -> FitResult<Vec<FitOptions>>;

    /// Algorithmic criteria for whether the fit is good or bad.
    ///
    /// Must be a pure function of the fit data.
    fn evaluate_quality(&self, fit_data: &FitData) -> Quality;

    /// Which fit parameters map to which user-facing result names.
    fn result_parameters(&self) -> Vec<ParameterRepr>;
}

/// Run a strategy's fit over processed series data.
///
/// Generates the candidate seeds, fits each, and returns the converged fit
/// with the lowest reduced chi-squared.
pub fn run_fit(
    analysis: &dyn CurveAnalysis,
    data: &[SeriesData],
    options: &AnalysisOptions,
) -> FitResult<FitData> {
    if data.len() != analysis.series_count() {
        return Err(FitError::InvalidOption(format!(
            "{} expects {} series, got {}",
            analysis.name(),
            analysis.series_count(),
            data.len()
        )));
    }

    let candidates = analysis.generate_guesses(options, data)?;
    let fit = fit_any(
        |series, x, params| analysis.model(series, x, params),
        data,
        &candidates,
    )?;

    debug!(
        analysis = analysis.name(),
        reduced_chisq = fit.reduced_chisq,
        quality = %analysis.evaluate_quality(&fit),
        "analysis fit complete"
    );
    Ok(fit)
}

/// Apply user bound overrides and (already scaled) user guesses to a
/// strategy's default fit options.
pub(crate) fn apply_user_options(
    mut fit_options: FitOptions,
    p0: &FxHashMap<String, f64>,
    bounds: &FxHashMap<String, (f64, f64)>,
) -> FitResult<FitOptions> {
    for (name, (lower, upper)) in bounds {
        fit_options.set_bounds(name, *lower, *upper)?;
    }
    for (name, value) in p0 {
        fit_options.set_guess(name, *value)?;
    }
    Ok(fit_options)
}
