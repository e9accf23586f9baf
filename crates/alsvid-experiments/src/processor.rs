//! Data processing: raw counts into processed points.
//!
//! The pipeline configuration comes from the analysis strategy (which
//! outcome to project); the conversion itself lives at this boundary so
//! other representations (kerneled signals, discriminated levels) can slot
//! in later without touching the strategies.

use alsvid_curve::ProcessedPoint;
use alsvid_hal::Counts;

use crate::error::{ExpResult, ExperimentError};

/// Configured processing pipeline for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataProcessor {
    /// Project the population of a single measured outcome with a binomial
    /// standard error.
    Probability {
        /// The outcome bitstring to project, e.g. `"1"`.
        outcome: String,
    },
}

impl DataProcessor {
    /// Probability processor for an outcome.
    pub fn probability(outcome: impl Into<String>) -> Self {
        Self::Probability {
            outcome: outcome.into(),
        }
    }

    /// Convert one circuit's counts into a processed point at `x`.
    ///
    /// Uses a half-count prior, `p = (c + 0.5) / (n + 1)`, so all-identical
    /// counts still carry a finite standard error and zero-variance scans
    /// cannot produce infinite fit weights.
    pub fn process(&self, x: f64, counts: &Counts) -> ExpResult<ProcessedPoint> {
        match self {
            DataProcessor::Probability { outcome } => {
                let total = counts.total();
                if total == 0 {
                    return Err(ExperimentError::Analysis(
                        "Cannot process a result with zero shots".into(),
                    ));
                }
                let hits = counts.get(outcome);
                let n = total as f64;
                let p = (hits as f64 + 0.5) / (n + 1.0);
                let sigma = (p * (1.0 - p) / n).sqrt();
                Ok(ProcessedPoint::new(x, p, sigma))
            }
        }
    }
}
