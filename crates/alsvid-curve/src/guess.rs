//! Initial-guess heuristics for the analysis strategies.
//!
//! Every function here must return something finite (or `None`) on
//! degenerate input — zero-variance data, a single point, unsorted scans —
//! so that strategies can always fall back to a default seed instead of
//! crashing before the fit.

/// Mean of the trailing `fraction` of the series (at least one point).
///
/// Used as the asymptote guess for decay fits.
pub fn tail_average(y: &[f64], fraction: f64) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let n = ((y.len() as f64 * fraction).ceil() as usize).clamp(1, y.len());
    let tail = &y[y.len() - n..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Midpoint between the extrema; the constant offset of a sinusoid.
pub fn constant_sinusoidal_offset(y: &[f64]) -> f64 {
    let (min, max) = min_max(y);
    0.5 * (min + max)
}

/// Half the peak-to-peak range; the amplitude of a sinusoid.
pub fn oscillation_amplitude(y: &[f64]) -> f64 {
    let (min, max) = min_max(y);
    0.5 * (max - min)
}

/// Decay constant from the 1/e crossing of `y - base`.
///
/// Scans for the first x where the signal has dropped below `1/e` of its
/// initial excursion and interpolates linearly. Falls back to a log-linear
/// regression when the scan never crosses, and to `None` when the data has
/// no usable excursion at all (e.g. zero-variance input).
pub fn exp_decay_tau(x: &[f64], y: &[f64], base: f64) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let y0 = y[0] - base;
    if !y0.is_finite() || y0.abs() < f64::EPSILON {
        return log_linear_tau(x, y, base);
    }
    let target = base + y0 / std::f64::consts::E;

    for i in 1..y.len() {
        let crossed = if y0 > 0.0 {
            y[i] <= target
        } else {
            y[i] >= target
        };
        if crossed {
            let (x0, x1) = (x[i - 1], x[i]);
            let (f0, f1) = (y[i - 1], y[i]);
            let t = if (f1 - f0).abs() > f64::EPSILON {
                x0 + (target - f0) * (x1 - x0) / (f1 - f0)
            } else {
                x1
            };
            return (t.is_finite() && t > 0.0).then_some(t);
        }
    }

    log_linear_tau(x, y, base)
}

/// Least-squares slope of `ln(y - base)` against x, negated and inverted.
fn log_linear_tau(x: &[f64], y: &[f64], base: f64) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(&xi, &yi)| {
            let excursion = yi - base;
            (excursion > 0.0).then(|| (xi, excursion.ln()))
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let sx: f64 = pairs.iter().map(|(xi, _)| xi).sum();
    let sl: f64 = pairs.iter().map(|(_, li)| li).sum();
    let (xbar, lbar) = (sx / n, sl / n);

    let mut cov = 0.0;
    let mut var = 0.0;
    for (xi, li) in &pairs {
        cov += (xi - xbar) * (li - lbar);
        var += (xi - xbar) * (xi - xbar);
    }
    if var <= 0.0 || !cov.is_finite() {
        return None;
    }
    let slope = cov / var;
    (slope < 0.0).then(|| -1.0 / slope)
}

/// Dominant frequency of a roughly uniformly sampled series.
///
/// Evaluates a periodogram on the discrete frequency grid `k / (n·dx)` for
/// `k = 1..n/2` and returns the frequency with maximal power. Returns `None`
/// when the sampling or the signal cannot support a frequency estimate.
pub fn frequency(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 4 || y.len() != n {
        return None;
    }
    let span = x[n - 1] - x[0];
    if !(span.is_finite() && span > 0.0) {
        return None;
    }
    let dx = span / (n - 1) as f64;

    let mean = y.iter().sum::<f64>() / n as f64;
    let mut best: Option<(f64, f64)> = None;

    for k in 1..=n / 2 {
        let freq = k as f64 / (n as f64 * dx);
        let omega = 2.0 * std::f64::consts::PI * freq;
        let mut re = 0.0;
        let mut im = 0.0;
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let phase = omega * (xi - x[0]);
            re += (yi - mean) * phase.cos();
            im += (yi - mean) * phase.sin();
        }
        let power = re * re + im * im;
        if best.is_none_or(|(_, p)| power > p) {
            best = Some((freq, power));
        }
    }

    match best {
        Some((freq, power)) if power > 1e-12 => Some(freq),
        _ => None,
    }
}

fn min_max(y: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in y {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}
