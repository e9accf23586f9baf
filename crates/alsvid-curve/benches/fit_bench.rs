//! Benchmark for the Levenberg–Marquardt fit engine.

use criterion::{criterion_group, criterion_main, Criterion};

use alsvid_curve::data::{ProcessedPoint, SeriesData};
use alsvid_curve::fitter::curve_fit;
use alsvid_curve::options::FitOptions;

fn decay_series(n: usize) -> SeriesData {
    let mut series = SeriesData::new("");
    for i in 0..n {
        let x = 1e-6 + 3e-6 * i as f64;
        series.push(ProcessedPoint::new(x, (-x / 25e-6_f64).exp() + 0.02, 0.005));
    }
    series
}

fn bench_decay_fit(c: &mut Criterion) {
    let data = [decay_series(13)];
    let mut options = FitOptions::new(["amp", "tau", "base"]);
    options.set_bounds("tau", 1e-12, f64::INFINITY).unwrap();
    options.set_guess("amp", 0.9).unwrap();
    options.set_guess("tau", 10e-6).unwrap();
    options.set_guess("base", 0.1).unwrap();

    c.bench_function("decay_fit_13_points", |b| {
        b.iter(|| {
            curve_fit(
                |_, x, p: &[f64]| p[0] * (-x / p[1]).exp() + p[2],
                std::hint::black_box(&data),
                &options,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_decay_fit);
criterion_main!(benches);
