//! Experiment runner: execute circuits, process counts, fit, store.

use std::cmp::Ordering;

use futures::future;
use tracing::{info, instrument, warn};

use alsvid_curve::analysis::run_fit;
use alsvid_curve::{AnalysisOptions, CurveAnalysis, FitError, Quality, SeriesData};
use alsvid_hal::{Backend, ExecutionResult, JobId};
use alsvid_ir::Circuit;

use crate::data::{AnalysisResult, CircuitResult, ExperimentData};
use crate::error::{ExpResult, ExperimentError};
use crate::experiment::Experiment;
use crate::processor::DataProcessor;

/// Submit a batch of circuits as independent jobs and await every result.
///
/// Submissions run in order; completed results are collected concurrently,
/// so a slow job does not serialize the rest of the scan.
pub(crate) async fn execute_circuits(
    backend: &dyn Backend,
    circuits: &[Circuit],
    shots: u32,
) -> ExpResult<(Vec<JobId>, Vec<ExecutionResult>)> {
    let mut job_ids = Vec::with_capacity(circuits.len());
    for circuit in circuits {
        job_ids.push(backend.submit(circuit, shots).await?);
    }

    let results = future::try_join_all(job_ids.iter().map(|id| backend.wait(id))).await?;
    Ok((job_ids, results))
}

/// Run one experiment end to end: generate circuits, execute them, and
/// analyze the returned counts into the experiment-data container.
#[instrument(skip(experiment, backend), fields(experiment = experiment.experiment_type()))]
pub async fn run_experiment(
    experiment: &dyn Experiment,
    backend: &dyn Backend,
    shots: u32,
) -> ExpResult<ExperimentData> {
    let circuits = experiment.circuits()?;
    if circuits.is_empty() {
        return Err(ExperimentError::EmptyScan(
            experiment.experiment_type().to_string(),
        ));
    }
    info!(
        circuits = circuits.len(),
        shots,
        backend = backend.name(),
        "running experiment"
    );

    let (job_ids, results) = execute_circuits(backend, &circuits, shots).await?;

    let mut data = ExperimentData::new(
        experiment.experiment_type(),
        experiment.physical_qubits(),
    );
    data.job_ids = job_ids;

    for (circuit, result) in circuits.iter().zip(results) {
        let metadata = circuit
            .metadata()
            .cloned()
            .ok_or_else(|| ExperimentError::MissingMetadata(circuit.name().to_string()))?;
        data.data.push(CircuitResult {
            counts: result.counts,
            shots: result.shots,
            metadata,
        });
    }

    analyze(experiment, &mut data)?;
    Ok(data)
}

/// Run an experiment's analysis over already-collected raw results.
///
/// A [`FitError::FitFailure`] is recorded as bad-quality results rather
/// than propagated: partial results remain useful for diagnostics and the
/// pipeline must not crash on a non-converging scan. Insufficient data and
/// invalid options are real errors and propagate.
pub fn analyze(experiment: &dyn Experiment, data: &mut ExperimentData) -> ExpResult<()> {
    let analysis = experiment.analysis();
    let options = experiment.analysis_options()?;
    let series = collect_series(analysis.as_ref(), &options, &data.data)?;

    match run_fit(analysis.as_ref(), &series, &options) {
        Ok(fit) => {
            let quality = analysis.evaluate_quality(&fit);
            for repr in analysis.result_parameters() {
                let value = fit.fitval(&repr.param);
                if value.is_none() {
                    warn!(param = %repr.param, "fit did not report a requested parameter");
                }
                data.analysis_results.push(AnalysisResult {
                    name: repr.repr,
                    value,
                    unit: repr.unit,
                    quality,
                    reduced_chisq: Some(fit.reduced_chisq),
                });
            }
        }
        Err(FitError::FitFailure(reason)) => {
            warn!(%reason, "fit failed; recording bad-quality results");
            for repr in analysis.result_parameters() {
                data.analysis_results.push(AnalysisResult {
                    name: repr.repr,
                    value: None,
                    unit: repr.unit,
                    quality: Quality::Bad,
                    reduced_chisq: None,
                });
            }
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Group raw circuit results into processed series for the analysis.
fn collect_series(
    analysis: &dyn CurveAnalysis,
    options: &AnalysisOptions,
    results: &[CircuitResult],
) -> ExpResult<Vec<SeriesData>> {
    let outcome = options
        .outcome
        .clone()
        .unwrap_or_else(|| analysis.outcome().to_string());
    let processor = DataProcessor::probability(outcome);

    let names = analysis.series_names();
    let mut series: Vec<SeriesData> = names.iter().map(|name| SeriesData::new(*name)).collect();

    for result in results {
        let index = if names.len() == 1 {
            0
        } else {
            let tag = result.metadata.extra_str("series").ok_or_else(|| {
                ExperimentError::MissingMetadata(format!(
                    "series tag on {} circuit",
                    result.metadata.experiment_type
                ))
            })?;
            names
                .iter()
                .position(|name| *name == tag)
                .ok_or_else(|| ExperimentError::Analysis(format!("Unknown series tag: {tag}")))?
        };

        let point = processor.process(result.metadata.xval, &result.counts)?;
        series[index].push(point);
    }

    for s in &mut series {
        s.points
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t1::T1;
    use alsvid_hal::Counts;
    use alsvid_ir::Metadata;

    fn counts(zero: u64, one: u64) -> Counts {
        [("0".to_string(), zero), ("1".to_string(), one)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_analyze_from_raw_counts() {
        // Survival populations for tau = 25 ns on a 1-37 ns scan, 10000
        // shots each.
        let populations = [
            9608, 8521, 7558, 6703, 5945, 5273, 4677, 4148, 3679, 3263, 2894, 2567, 2276,
        ];

        let mut data = ExperimentData::new("t1", vec![0]);
        for (i, &one) in populations.iter().enumerate() {
            data.data.push(CircuitResult {
                counts: counts(10000 - one, one),
                shots: 10000,
                metadata: Metadata::new("t1", [0], (3 * i + 1) as f64 * 1e-9, "s"),
            });
        }

        let exp = T1::new(0, vec![]);
        analyze(&exp, &mut data).unwrap();

        let result = data.analysis_result("T1").unwrap();
        assert_eq!(result.quality, Quality::Good);
        let tau = result.value.unwrap().value;
        assert!((tau - 25e-9).abs() < 3e-9);
    }

    #[test]
    fn test_analyze_flat_data_is_bad_not_crash() {
        let mut data = ExperimentData::new("t1", vec![0]);
        for i in 0..10 {
            data.data.push(CircuitResult {
                counts: counts(10, 10),
                shots: 20,
                metadata: Metadata::new("t1", [0], i as f64 * 1e-9, "s"),
            });
        }

        let exp = T1::new(0, vec![]);
        analyze(&exp, &mut data).unwrap();
        assert_eq!(data.analysis_result("T1").unwrap().quality, Quality::Bad);
    }

    #[test]
    fn test_insufficient_data_propagates() {
        let mut data = ExperimentData::new("t1", vec![0]);
        for i in 0..2 {
            data.data.push(CircuitResult {
                counts: counts(5, 5),
                shots: 10,
                metadata: Metadata::new("t1", [0], i as f64, "s"),
            });
        }

        let exp = T1::new(0, vec![]);
        let err = analyze(&exp, &mut data).unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::Fit(FitError::InsufficientData { .. })
        ));
    }
}
