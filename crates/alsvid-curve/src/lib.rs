//! Alsvid curve-fitting engine
//!
//! Turns noisy measurement statistics into point estimates with
//! uncertainty: a weighted Levenberg–Marquardt core ([`fitter`]), automated
//! initial-guess heuristics ([`guess`]), and per-experiment analysis
//! strategies ([`analysis`]) that bundle a model, guesses, parameter
//! bounds, and an algorithmic good/bad quality judgment.
//!
//! # Example: fitting a decay
//!
//! ```
//! use alsvid_curve::analysis::{run_fit, AnalysisOptions, DecayAnalysis};
//! use alsvid_curve::data::{ProcessedPoint, SeriesData};
//!
//! let mut series = SeriesData::new("");
//! for i in 0..12 {
//!     let x = i as f64 * 2e-6;
//!     series.push(ProcessedPoint::new(x, (-x / 10e-6_f64).exp(), 0.01));
//! }
//!
//! let analysis = DecayAnalysis::new();
//! let fit = run_fit(&analysis, &[series], &AnalysisOptions::new()).unwrap();
//! let tau = fit.fitval("tau").unwrap();
//! assert!((tau.value - 10e-6).abs() < 1e-7);
//! ```

pub mod analysis;
pub mod data;
pub mod error;
pub mod fitter;
pub mod guess;
pub mod options;
pub mod result;

pub use analysis::{
    AnalysisOptions, CurveAnalysis, DecayAnalysis, ErrorAmplificationAnalysis,
    OscillationDecayAnalysis, RamseyXyAnalysis,
};
pub use data::{ProcessedPoint, SeriesData};
pub use error::{FitError, FitResult};
pub use fitter::{curve_fit, fit_any};
pub use options::{FitOptions, ParamHint};
pub use result::{FitData, FitValue, ParameterRepr, Quality};
