//! Processed data series consumed by the fit engine.

use serde::{Deserialize, Serialize};

/// A single processed observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPoint {
    /// The scanned x-value.
    pub x: f64,
    /// The observed y-value (e.g. excited-state population).
    pub y: f64,
    /// Standard error of `y`, if the processing pipeline propagated one.
    pub sigma: Option<f64>,
}

impl ProcessedPoint {
    /// Create a point with a known standard error.
    pub fn new(x: f64, y: f64, sigma: f64) -> Self {
        Self {
            x,
            y,
            sigma: Some(sigma),
        }
    }

    /// Create a point without uncertainty information.
    pub fn unweighted(x: f64, y: f64) -> Self {
        Self { x, y, sigma: None }
    }
}

/// An ordered series of processed points.
///
/// Multi-series fits pass several of these to the engine; all series share
/// one parameter vector and the model function selects its branch by series
/// index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesData {
    /// Series tag, e.g. `"X"` / `"Y"` for Ramsey quadratures.
    pub name: String,
    /// The points, ordered by scan position.
    pub points: Vec<ProcessedPoint>,
}

impl SeriesData {
    /// Create an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: vec![],
        }
    }

    /// Append a point.
    pub fn push(&mut self, point: ProcessedPoint) {
        self.points.push(point);
    }

    /// Number of points in the series.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The x-values of the series.
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// The y-values of the series.
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}
