//! End-to-end T1 tests against the simulator backend.

use alsvid_adapter_sim::{QubitModel, SimulatorBackend};
use alsvid_curve::Quality;
use alsvid_experiments::{run_experiment, ExperimentError, ParallelExperiment, T1};
use alsvid_hal::HalError;

fn t1_delays() -> Vec<f64> {
    // 13 points from 1 µs to 37 µs in 3 µs steps.
    (0..13).map(|i| 1e-6 + 3e-6 * i as f64).collect()
}

#[tokio::test]
async fn t1_end_to_end() {
    let t1 = 25e-6;
    let backend = SimulatorBackend::new(vec![QubitModel::new()
        .with_t1(t1)
        .with_readout_error(0.02, 0.02)])
    .with_seed(1234);

    let exp = T1::new(0, t1_delays());
    let data = run_experiment(&exp, &backend, 10_000).await.unwrap();

    assert_eq!(data.job_ids.len(), 13);
    assert_eq!(data.data.len(), 13);

    let result = data.analysis_result("T1").unwrap();
    assert_eq!(result.quality, Quality::Good);
    assert_eq!(result.unit.as_deref(), Some("s"));

    let fitted = result.value.unwrap();
    assert!(
        (fitted.value - t1).abs() < 3e-6,
        "fitted T1 {} too far from {}",
        fitted.value,
        t1
    );
    assert!(fitted.stderr.is_some());
}

#[tokio::test]
async fn t1_parallel_matches_independent_runs() {
    let models = vec![
        QubitModel::new().with_t1(25e-6),
        QubitModel::new(),
        QubitModel::new().with_t1(15e-6),
    ];

    // One parallel batch over qubits 0 and 2.
    let backend = SimulatorBackend::new(models.clone()).with_seed(42);
    let par = ParallelExperiment::new(vec![
        Box::new(T1::new(0, t1_delays())),
        Box::new(T1::new(2, t1_delays())),
    ])
    .unwrap();
    let par_data = par.run(&backend, 10_000).await.unwrap();

    assert_eq!(par_data.child_data.len(), 2);

    let expectations = [25e-6, 15e-6];
    let mut parallel_taus = vec![];
    for (child, expected) in par_data.child_data.iter().zip(expectations) {
        let result = child.analysis_result("T1").unwrap();
        assert_eq!(result.quality, Quality::Good);
        let tau = result.value.unwrap().value;
        assert!((tau - expected).abs() < 3e-6);
        parallel_taus.push(tau);
    }

    // Independent runs on the same synthetic model agree within solver
    // plus sampling tolerance.
    let backend = SimulatorBackend::new(models).with_seed(43);
    for (experiment, (expected, parallel_tau)) in [T1::new(0, t1_delays()), T1::new(2, t1_delays())]
        .iter()
        .zip(expectations.into_iter().zip(parallel_taus))
    {
        let data = run_experiment(experiment, &backend, 10_000).await.unwrap();
        let tau = data.analysis_result("T1").unwrap().value.unwrap().value;
        assert!((tau - expected).abs() < 3e-6);
        assert!((tau - parallel_tau).abs() < 2e-6);
    }
}

#[tokio::test]
async fn backend_errors_surface_unmodified() {
    // The experiment targets a qubit the backend does not model.
    let backend = SimulatorBackend::ideal(1);
    let exp = T1::new(1, t1_delays());

    let err = run_experiment(&exp, &backend, 1000).await.unwrap_err();
    assert!(matches!(
        err,
        ExperimentError::Backend(HalError::InvalidCircuit(_))
    ));
}

#[tokio::test]
async fn flat_scan_reports_bad_quality_without_crashing() {
    // No relaxation at all: the decay fit cannot converge to a sensible
    // tau, but the pipeline must still record a result.
    let backend = SimulatorBackend::new(vec![
        QubitModel::new().with_readout_error(0.5, 0.5)
    ])
    .with_seed(7);

    let data = run_experiment(&T1::new(0, t1_delays()), &backend, 1000)
        .await
        .unwrap();
    let result = data.analysis_result("T1").unwrap();
    assert_eq!(result.quality, Quality::Bad);
}
