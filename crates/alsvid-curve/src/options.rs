//! Fit parameter seeds: initial guesses and box bounds.

use crate::error::{FitError, FitResult};

/// Hint for a single fit parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamHint {
    /// Initial guess, if set.
    pub guess: Option<f64>,
    /// Lower and upper bound; infinite values mean unbounded.
    pub bounds: (f64, f64),
}

impl Default for ParamHint {
    fn default() -> Self {
        Self {
            guess: None,
            bounds: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

/// Ordered per-parameter seeds for the optimizer.
///
/// Built by an analysis strategy from its defaults merged with any
/// user-supplied partial specification; malformed entries are rejected at
/// configuration time, not deferred to fit time. Parameters the caller
/// leaves unset are resolved by the engine (midpoint of finite bounds,
/// otherwise zero) so the solver always has a finite starting point.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    params: Vec<(String, ParamHint)>,
}

impl FitOptions {
    /// Create options for a named parameter list.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: names
                .into_iter()
                .map(|n| (n.into(), ParamHint::default()))
                .collect(),
        }
    }

    /// Number of free parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in fit order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    /// Look up the hint for a parameter.
    pub fn hint(&self, name: &str) -> Option<&ParamHint> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, h)| h)
    }

    fn hint_mut(&mut self, name: &str) -> FitResult<&mut ParamHint> {
        self.params
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
            .ok_or_else(|| FitError::InvalidOption(format!("Unknown fit parameter: {name}")))
    }

    /// Set the initial guess for a parameter.
    ///
    /// Rejects non-finite guesses and guesses outside the current bounds.
    pub fn set_guess(&mut self, name: &str, value: f64) -> FitResult<()> {
        let hint = self.hint_mut(name)?;
        if !value.is_finite() {
            return Err(FitError::InvalidOption(format!(
                "Guess for {name} is not finite: {value}"
            )));
        }
        let (lo, hi) = hint.bounds;
        if value < lo || value > hi {
            return Err(FitError::InvalidOption(format!(
                "Guess for {name} ({value}) outside bounds [{lo}, {hi}]"
            )));
        }
        hint.guess = Some(value);
        Ok(())
    }

    /// Set the guess only if the caller has not already supplied one.
    ///
    /// Values outside the bounds are clipped rather than rejected, since
    /// heuristics may overshoot on pathological data.
    pub fn default_guess(&mut self, name: &str, value: f64) -> FitResult<()> {
        let hint = self.hint_mut(name)?;
        if hint.guess.is_none() && value.is_finite() {
            let (lo, hi) = hint.bounds;
            hint.guess = Some(value.clamp(lo, hi));
        }
        Ok(())
    }

    /// Set the bounds for a parameter.
    ///
    /// Requires `lower < upper`; an existing guess must remain inside.
    pub fn set_bounds(&mut self, name: &str, lower: f64, upper: f64) -> FitResult<()> {
        if lower.is_nan() || upper.is_nan() || lower >= upper {
            return Err(FitError::InvalidOption(format!(
                "Invalid bounds for {name}: [{lower}, {upper}]"
            )));
        }
        let hint = self.hint_mut(name)?;
        if let Some(guess) = hint.guess {
            if guess < lower || guess > upper {
                return Err(FitError::InvalidOption(format!(
                    "Existing guess for {name} ({guess}) outside new bounds [{lower}, {upper}]"
                )));
            }
        }
        hint.bounds = (lower, upper);
        Ok(())
    }

    /// Builder-style guess setter.
    pub fn with_guess(mut self, name: &str, value: f64) -> FitResult<Self> {
        self.set_guess(name, value)?;
        Ok(self)
    }

    /// Builder-style bounds setter.
    pub fn with_bounds(mut self, name: &str, lower: f64, upper: f64) -> FitResult<Self> {
        self.set_bounds(name, lower, upper)?;
        Ok(self)
    }

    /// Current guess for a parameter, if set.
    pub fn guess(&self, name: &str) -> Option<f64> {
        self.hint(name).and_then(|h| h.guess)
    }

    /// Resolve all guesses into a finite starting vector.
    ///
    /// Unset guesses default to the midpoint of finite bounds, or zero when
    /// a side is unbounded; every entry is clamped into its bounds.
    pub fn resolved_guesses(&self) -> Vec<f64> {
        self.params
            .iter()
            .map(|(_, hint)| {
                let (lo, hi) = hint.bounds;
                let raw = hint.guess.unwrap_or_else(|| {
                    if lo.is_finite() && hi.is_finite() {
                        0.5 * (lo + hi)
                    } else if lo.is_finite() {
                        lo
                    } else if hi.is_finite() {
                        hi
                    } else {
                        0.0
                    }
                });
                raw.clamp(lo, hi)
            })
            .collect()
    }

    /// Bounds in fit order.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.params.iter().map(|(_, h)| h.bounds).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds_rejected_at_set_time() {
        let mut opts = FitOptions::new(["tau"]);
        let err = opts.set_bounds("tau", 2.0, 1.0).unwrap_err();
        assert!(matches!(err, FitError::InvalidOption(_)));
    }

    #[test]
    fn test_guess_outside_bounds_rejected() {
        let mut opts = FitOptions::new(["amp"]);
        opts.set_bounds("amp", -1.0, 1.0).unwrap();
        assert!(opts.set_guess("amp", 3.0).is_err());
    }

    #[test]
    fn test_default_guess_does_not_override_user() {
        let mut opts = FitOptions::new(["tau"]);
        opts.set_guess("tau", 5.0).unwrap();
        opts.default_guess("tau", 1.0).unwrap();
        assert_eq!(opts.guess("tau"), Some(5.0));
    }

    #[test]
    fn test_resolved_guesses_fill_unset() {
        let mut opts = FitOptions::new(["a", "b", "c"]);
        opts.set_bounds("a", 0.0, 2.0).unwrap();
        opts.set_guess("b", 7.0).unwrap();

        let resolved = opts.resolved_guesses();
        assert_eq!(resolved, vec![1.0, 7.0, 0.0]);
    }

    #[test]
    fn test_unknown_parameter() {
        let mut opts = FitOptions::new(["tau"]);
        assert!(opts.set_guess("nope", 1.0).is_err());
    }
}
