//! Weighted nonlinear least-squares fitting.
//!
//! A Levenberg–Marquardt solver over one or more data series that share a
//! single parameter vector. Multi-series fits concatenate the residuals of
//! every series; the model function selects its branch by series index, so
//! parameter sharing across series (e.g. a common oscillation frequency for
//! two quadratures) falls out of the formulation instead of requiring
//! constrained independent fits.
//!
//! Weights are `1/sigma` per residual when every point carries a finite
//! positive standard error, otherwise the fit is unweighted. Box bounds are
//! enforced by projecting trial steps into the feasible region.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use crate::data::SeriesData;
use crate::error::{FitError, FitResult};
use crate::options::FitOptions;
use crate::result::{FitData, FitValue};

const MAX_ITERATIONS: usize = 100;
const MAX_LAMBDA: f64 = 1e12;
const INITIAL_LAMBDA: f64 = 1e-3;
const FTOL: f64 = 1e-10;
const GTOL: f64 = 1e-10;

/// One flattened observation.
struct Observation {
    series: usize,
    x: f64,
    y: f64,
    weight: f64,
}

/// Fit a model to one or more series sharing a parameter vector.
///
/// `model(series, x, params)` returns the predicted y-value. The free
/// parameter set, starting guesses, and bounds come from `options`.
///
/// # Errors
///
/// - [`FitError::InsufficientData`] when the total point count does not
///   exceed the free parameter count; the optimizer is never invoked.
/// - [`FitError::FitFailure`] on non-convergence or a singular system that
///   blocks all progress.
/// - [`FitError::InvalidOption`] when `options` is empty.
pub fn curve_fit<M>(model: M, data: &[SeriesData], options: &FitOptions) -> FitResult<FitData>
where
    M: Fn(usize, f64, &[f64]) -> f64,
{
    let n_params = options.len();
    if n_params == 0 {
        return Err(FitError::InvalidOption(
            "No free fit parameters declared".into(),
        ));
    }

    let n_points: usize = data.iter().map(SeriesData::len).sum();
    if n_points <= n_params {
        return Err(FitError::InsufficientData {
            points: n_points,
            params: n_params,
        });
    }
    let dof = n_points - n_params;

    // Weighted only when the whole data set carries usable uncertainties.
    let weighted = data
        .iter()
        .flat_map(|s| s.points.iter())
        .all(|p| p.sigma.is_some_and(|s| s.is_finite() && s > 0.0));

    let observations: Vec<Observation> = data
        .iter()
        .enumerate()
        .flat_map(|(series, s)| {
            s.points.iter().map(move |p| Observation {
                series,
                x: p.x,
                y: p.y,
                weight: if weighted {
                    1.0 / p.sigma.unwrap_or(1.0)
                } else {
                    1.0
                },
            })
        })
        .collect();

    let bounds = options.bounds();
    let clamp = |params: &mut [f64]| {
        for (p, (lo, hi)) in params.iter_mut().zip(&bounds) {
            *p = p.clamp(*lo, *hi);
        }
    };

    let residuals = |params: &[f64]| -> DVector<f64> {
        DVector::from_iterator(
            observations.len(),
            observations
                .iter()
                .map(|o| o.weight * (o.y - model(o.series, o.x, params))),
        )
    };

    let jacobian = |params: &[f64]| -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(observations.len(), n_params);
        let mut shifted = params.to_vec();
        for j in 0..n_params {
            let h = 6e-6 * params[j].abs().max(1e-3);
            shifted[j] = params[j] + h;
            let plus: Vec<f64> = observations
                .iter()
                .map(|o| model(o.series, o.x, &shifted))
                .collect();
            shifted[j] = params[j] - h;
            for (i, o) in observations.iter().enumerate() {
                let minus = model(o.series, o.x, &shifted);
                jac[(i, j)] = o.weight * (plus[i] - minus) / (2.0 * h);
            }
            shifted[j] = params[j];
        }
        jac
    };

    let mut params = options.resolved_guesses();
    clamp(&mut params);

    let mut r = residuals(&params);
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(FitError::FitFailure(
            "Model is non-finite at the initial guess".into(),
        ));
    }

    let mut lambda = INITIAL_LAMBDA;
    let mut converged = false;

    for iteration in 0..MAX_ITERATIONS {
        let jac = jacobian(&params);
        let jt = jac.transpose();
        let gradient = &jt * &r;
        let normal = &jt * &jac;

        if !gradient.iter().all(|g| g.is_finite()) {
            return Err(FitError::FitFailure(format!(
                "Non-finite gradient at iteration {iteration}"
            )));
        }
        if gradient.amax() < GTOL * (1.0 + cost) {
            converged = true;
            break;
        }

        // Inner damping loop: raise lambda until a step is accepted.
        let mut accepted = false;
        while lambda <= MAX_LAMBDA {
            let mut damped = normal.clone();
            for j in 0..n_params {
                let d = normal[(j, j)].max(1e-12);
                damped[(j, j)] = normal[(j, j)] + lambda * d;
            }

            let Some(chol) = damped.cholesky() else {
                lambda *= 10.0;
                continue;
            };
            let step = chol.solve(&gradient);

            let mut trial: Vec<f64> = params
                .iter()
                .zip(step.iter())
                .map(|(p, d)| p + d)
                .collect();
            clamp(&mut trial);

            let r_trial = residuals(&trial);
            let cost_trial = r_trial.norm_squared();

            if cost_trial.is_finite() && cost_trial <= cost {
                let reduction = cost - cost_trial;
                params = trial;
                r = r_trial;
                cost = cost_trial;
                lambda = (lambda * 0.1).max(1e-12);
                accepted = true;

                trace!(iteration, cost, lambda, "accepted LM step");
                if reduction <= FTOL * cost.max(f64::MIN_POSITIVE) {
                    converged = true;
                }
                break;
            }
            lambda *= 10.0;
        }

        if !accepted {
            // Damping exhausted without an acceptable step; at this point
            // the gradient is still significant, so report failure.
            return Err(FitError::FitFailure(format!(
                "No acceptable step at iteration {iteration} (damping exhausted)"
            )));
        }
        if converged {
            break;
        }
    }

    if !converged {
        return Err(FitError::FitFailure(format!(
            "Did not converge within {MAX_ITERATIONS} iterations"
        )));
    }

    let reduced_chisq = cost / dof as f64;
    debug!(reduced_chisq, dof, "curve fit converged");

    // Covariance from the unscaled normal matrix at the solution. A
    // singular normal matrix here means standard errors are unavailable,
    // not that the fit failed.
    let jac = jacobian(&params);
    let normal = jac.transpose() * &jac;
    let scale = if weighted { 1.0 } else { reduced_chisq };
    let covariance = normal.try_inverse();

    let values: Vec<(String, FitValue)> = options
        .names()
        .enumerate()
        .map(|(j, name)| {
            let stderr = covariance.as_ref().and_then(|cov| {
                let var = cov[(j, j)] * scale;
                (var.is_finite() && var >= 0.0).then(|| var.sqrt())
            });
            (name.to_string(), FitValue::new(params[j], stderr))
        })
        .collect();

    Ok(FitData::new(values, reduced_chisq, dof))
}

/// Fit each candidate seed and keep the best converged result.
///
/// Analysis strategies that multi-start (e.g. over oscillation phases) pass
/// several [`FitOptions`]; the converged fit with the lowest reduced
/// chi-squared wins. Candidates that fail are skipped; if every candidate
/// fails the last failure is returned.
pub fn fit_any<M>(model: M, data: &[SeriesData], candidates: &[FitOptions]) -> FitResult<FitData>
where
    M: Fn(usize, f64, &[f64]) -> f64,
{
    if candidates.is_empty() {
        return Err(FitError::InvalidOption(
            "No candidate fit options supplied".into(),
        ));
    }

    let mut best: Option<FitData> = None;
    let mut last_err: Option<FitError> = None;

    for options in candidates {
        match curve_fit(&model, data, options) {
            Ok(fit) => {
                let better = best
                    .as_ref()
                    .is_none_or(|b| fit.reduced_chisq < b.reduced_chisq);
                if better {
                    best = Some(fit);
                }
            }
            Err(err @ FitError::InsufficientData { .. }) => {
                // Insufficient data cannot improve with another seed.
                return Err(err);
            }
            Err(err) => {
                debug!(error = %err, "fit candidate rejected");
                last_err = Some(err);
            }
        }
    }

    best.ok_or_else(|| {
        last_err.unwrap_or_else(|| FitError::FitFailure("All fit candidates failed".into()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessedPoint;

    fn decay(amp: f64, tau: f64, base: f64, x: f64) -> f64 {
        amp * (-x / tau).exp() + base
    }

    fn decay_series(amp: f64, tau: f64, base: f64, sigma: Option<f64>) -> SeriesData {
        let mut series = SeriesData::new("0");
        for i in 0..13 {
            let x = 1e-6 + 3e-6 * i as f64;
            series.push(ProcessedPoint {
                x,
                y: decay(amp, tau, base, x),
                sigma,
            });
        }
        series
    }

    fn decay_options() -> FitOptions {
        let mut opts = FitOptions::new(["amp", "tau", "base"]);
        opts.set_bounds("tau", 1e-12, f64::INFINITY).unwrap();
        opts.set_guess("amp", 0.9).unwrap();
        opts.set_guess("tau", 10e-6).unwrap();
        opts.set_guess("base", 0.1).unwrap();
        opts
    }

    #[test]
    fn test_fit_recovers_noiseless_decay() {
        let data = [decay_series(1.0, 25e-6, 0.02, Some(0.01))];
        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);

        let fit = curve_fit(model, &data, &decay_options()).unwrap();

        assert!((fit.fitval("amp").unwrap().value - 1.0).abs() < 1e-4);
        assert!((fit.fitval("tau").unwrap().value - 25e-6).abs() < 1e-9);
        assert!((fit.fitval("base").unwrap().value - 0.02).abs() < 1e-4);
        assert_eq!(fit.dof, 10);
        assert!(fit.reduced_chisq < 1e-6);
    }

    #[test]
    fn test_fit_noisy_decay_chisq_near_one() {
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        let sigma = 0.005;
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let noise = Normal::new(0.0, sigma).unwrap();

        let mut data = decay_series(1.0, 25e-6, 0.0, Some(sigma));
        for p in &mut data.points {
            p.y += noise.sample(&mut rng);
        }

        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);
        let fit = curve_fit(model, &[data], &decay_options()).unwrap();

        // tau recovered within a few multiples of the injected noise scale.
        assert!((fit.fitval("tau").unwrap().value - 25e-6).abs() < 2e-6);
        // Correctly weighted noise concentrates reduced chi-squared near 1.
        assert!(fit.reduced_chisq > 0.2 && fit.reduced_chisq < 3.0);
        // Standard errors must be available for a well-posed problem.
        assert!(fit.fitval("tau").unwrap().stderr.is_some());
    }

    #[test]
    fn test_insufficient_data_fails_fast() {
        let mut series = SeriesData::new("0");
        series.push(ProcessedPoint::new(0.0, 1.0, 0.01));
        series.push(ProcessedPoint::new(1.0, 0.5, 0.01));

        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);
        let err = curve_fit(model, &[series], &decay_options()).unwrap_err();

        assert!(matches!(
            err,
            FitError::InsufficientData {
                points: 2,
                params: 3
            }
        ));
    }

    #[test]
    fn test_dof_boundary_equal_points_and_params() {
        // Exactly as many points as parameters leaves zero degrees of
        // freedom, which must also fail fast.
        let mut series = SeriesData::new("0");
        for i in 0..3 {
            series.push(ProcessedPoint::new(i as f64, 1.0, 0.01));
        }
        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);
        assert!(matches!(
            curve_fit(model, &[series], &decay_options()),
            Err(FitError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_multi_series_shared_parameters() {
        // Two quadratures sharing amp and freq: series 0 is cos, 1 is sin.
        let amp = 0.5;
        let freq = 2.0;
        let model = |s: usize, x: f64, p: &[f64]| {
            let phase = 2.0 * std::f64::consts::PI * p[1] * x;
            match s {
                0 => p[0] * phase.cos(),
                _ => p[0] * phase.sin(),
            }
        };

        let mut cos_series = SeriesData::new("X");
        let mut sin_series = SeriesData::new("Y");
        for i in 0..20 {
            let x = i as f64 * 0.02;
            cos_series.push(ProcessedPoint::new(x, model(0, x, &[amp, freq]), 0.01));
            sin_series.push(ProcessedPoint::new(x, model(1, x, &[amp, freq]), 0.01));
        }

        let mut opts = FitOptions::new(["amp", "freq"]);
        opts.set_guess("amp", 0.4).unwrap();
        opts.set_guess("freq", 1.7).unwrap();

        let fit = curve_fit(model, &[cos_series, sin_series], &opts).unwrap();
        assert!((fit.fitval("amp").unwrap().value - amp).abs() < 1e-6);
        assert!((fit.fitval("freq").unwrap().value - freq).abs() < 1e-6);
        assert_eq!(fit.dof, 38);
    }

    #[test]
    fn test_bounds_respected() {
        let data = [decay_series(1.0, 25e-6, 0.02, Some(0.01))];
        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);

        let mut opts = decay_options();
        opts.set_bounds("base", 0.05, 1.0).unwrap();
        opts.set_guess("base", 0.1).unwrap();

        let fit = curve_fit(model, &data, &opts).unwrap();
        assert!(fit.fitval("base").unwrap().value >= 0.05);
    }

    #[test]
    fn test_fit_any_picks_best_candidate() {
        let data = [decay_series(1.0, 25e-6, 0.0, Some(0.01))];
        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);

        let good = decay_options();
        let mut poor = decay_options();
        poor.set_guess("tau", 1e-3).unwrap();

        let fit = fit_any(model, &data, &[poor, good]).unwrap();
        assert!((fit.fitval("tau").unwrap().value - 25e-6).abs() < 1e-8);
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let data = [decay_series(1.0, 25e-6, 0.0, None)];
        let model = |_: usize, x: f64, p: &[f64]| decay(p[0], p[1], p[2], x);
        assert!(matches!(
            fit_any(model, &data, &[]),
            Err(FitError::InvalidOption(_))
        ));
    }
}
