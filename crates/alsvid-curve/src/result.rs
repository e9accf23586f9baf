//! Fit results and quality labels.

use serde::{Deserialize, Serialize};

/// A fitted parameter value with its standard error.
///
/// A missing standard error means the covariance could not be estimated for
/// this parameter; it is recorded as absent, never as zero, so quality
/// predicates can treat it as non-blocking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitValue {
    /// Point estimate.
    pub value: f64,
    /// Standard error, if available.
    pub stderr: Option<f64>,
}

impl FitValue {
    /// Create a value with a standard error.
    pub fn new(value: f64, stderr: Option<f64>) -> Self {
        Self { value, stderr }
    }

    /// Relative standard error, if both value and stderr allow it.
    pub fn relative_stderr(&self) -> Option<f64> {
        match self.stderr {
            Some(err) if self.value != 0.0 => Some((err / self.value).abs()),
            _ => None,
        }
    }
}

/// Result of a successful fit. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitData {
    params: Vec<(String, FitValue)>,
    /// Weighted residual sum of squares divided by degrees of freedom.
    pub reduced_chisq: f64,
    /// Degrees of freedom: total points minus free parameters.
    pub dof: usize,
}

impl FitData {
    /// Assemble a fit result.
    pub fn new(params: Vec<(String, FitValue)>, reduced_chisq: f64, dof: usize) -> Self {
        Self {
            params,
            reduced_chisq,
            dof,
        }
    }

    /// Look up a fitted parameter by name.
    pub fn fitval(&self, name: &str) -> Option<FitValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// All fitted parameters in fit order.
    pub fn params(&self) -> &[(String, FitValue)] {
        &self.params
    }
}

/// Algorithmic good/bad classification of a fit.
///
/// Derived deterministically from [`FitData`] by a per-analysis predicate;
/// the same fit data always yields the same label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    /// The fit passes all statistical and physical plausibility checks.
    Good,
    /// At least one check failed.
    Bad,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Good => write!(f, "good"),
            Quality::Bad => write!(f, "bad"),
        }
    }
}

/// Maps a fit parameter to a user-facing result name and unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRepr {
    /// Fit parameter name, e.g. `"tau"`.
    pub param: String,
    /// User-facing result name, e.g. `"T1"`.
    pub repr: String,
    /// Unit of the reported value, if any.
    pub unit: Option<String>,
}

impl ParameterRepr {
    /// Create a parameter representation.
    pub fn new(
        param: impl Into<String>,
        repr: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            param: param.into(),
            repr: repr.into(),
            unit: Some(unit.into()),
        }
    }

    /// Create a unitless parameter representation.
    pub fn unitless(param: impl Into<String>, repr: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            repr: repr.into(),
            unit: None,
        }
    }
}
