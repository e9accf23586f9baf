//! Simulator backend implementation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Binomial, Distribution};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use alsvid_hal::{
    Backend, BackendConfig, BackendFactory, Counts, ExecutionResult, HalError, HalResult, Job,
    JobId, JobStatus,
};
use alsvid_ir::Circuit;

use crate::bloch::measured_populations;
use crate::model::QubitModel;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Noisy single-qubit simulator backend.
///
/// Evolves each qubit's Bloch vector through the circuit with the
/// configured [`QubitModel`] noise, then samples shot outcomes from the
/// resulting measurement probabilities.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Per-qubit physical models.
    qubits: Vec<QubitModel>,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Shot sampler; seedable for deterministic tests.
    rng: Arc<Mutex<StdRng>>,
}

impl SimulatorBackend {
    /// Create a simulator with one model per physical qubit.
    pub fn new(qubits: Vec<QubitModel>) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            qubits,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Create an ideal simulator with `num_qubits` noiseless qubits.
    pub fn ideal(num_qubits: usize) -> Self {
        Self::new(vec![QubitModel::new(); num_qubits])
    }

    /// Seed the shot sampler for reproducible counts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Run the sampling simulation synchronously.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let populations = measured_populations(circuit, &self.qubits)?;
        debug!(
            measured = populations.len(),
            shots, "sampling measurement outcomes"
        );

        let num_clbits = circuit.num_clbits() as usize;
        let mut counts = Counts::new();
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let ([(0, p_one)], 1) = (&populations[..], num_clbits) {
            let p_one = *p_one;
            // Single measured bit: sample the whole scan point at once.
            let ones = Binomial::new(u64::from(shots), p_one.clamp(0.0, 1.0))
                .map_err(|e| HalError::Backend(e.to_string()))?
                .sample(&mut *rng);
            if ones > 0 {
                counts.insert("1", ones);
            }
            if u64::from(shots) > ones {
                counts.insert("0", u64::from(shots) - ones);
            }
        } else {
            let samplers: Vec<(u32, Bernoulli)> = populations
                .iter()
                .map(|&(clbit, p_one)| {
                    Bernoulli::new(p_one.clamp(0.0, 1.0))
                        .map(|b| (clbit, b))
                        .map_err(|e| HalError::Backend(e.to_string()))
                })
                .collect::<HalResult<_>>()?;

            for _ in 0..shots {
                // Rightmost character is clbit 0.
                let mut bits = vec!['0'; num_clbits];
                for (clbit, sampler) in &samplers {
                    if sampler.sample(&mut *rng) {
                        bits[num_clbits - 1 - *clbit as usize] = '1';
                    }
                }
                counts.insert(bits.iter().collect::<String>(), 1);
            }
        }

        let elapsed = start.elapsed();
        Ok(ExecutionResult::new(counts, shots)
            .with_execution_time(elapsed.as_millis() as u64)
            .with_metadata("meas_level", serde_json::json!(2)))
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if circuit.num_qubits() as usize > self.qubits.len() {
            return Err(HalError::InvalidCircuit(format!(
                "Circuit has {} qubits but simulator models {}",
                circuit.num_qubits(),
                self.qubits.len()
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend("simulator");

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }

        debug!("Submitted job: {}", job_id);

        // Run synchronously; a hardware adapter would defer this.
        let result = self.run_simulation(circuit, shots)?;

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(sim_job) = jobs.get_mut(&job_id.0) {
                sim_job.result = Some(result);
                sim_job.job = sim_job.job.clone().with_status(JobStatus::Completed);
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let num_qubits = config
            .extra
            .get("num_qubits")
            .and_then(serde_json::Value::as_u64)
            .map_or(1, |v| v as usize);
        let seed = config.extra.get("seed").and_then(serde_json::Value::as_u64);

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            qubits: vec![QubitModel::new(); num_qubits],
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Arc::new(Mutex::new(rng)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::{ClbitId, QubitId};

    fn x_circuit() -> Circuit {
        let mut circuit = Circuit::new("x", 1, 1);
        circuit.x(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit
    }

    #[tokio::test]
    async fn test_ideal_x_gate_counts() {
        let backend = SimulatorBackend::ideal(1).with_seed(1);
        let job_id = backend.submit(&x_circuit(), 1000).await.unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert!(status.is_success());

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.counts.get("1"), 1000);
        assert_eq!(result.counts.get("0"), 0);
    }

    #[tokio::test]
    async fn test_t1_decay_population() {
        let backend =
            SimulatorBackend::new(vec![QubitModel::new().with_t1(25e-6)]).with_seed(7);

        let mut circuit = Circuit::new("t1", 1, 1);
        circuit.x(QubitId(0)).unwrap();
        circuit.delay(QubitId(0), 25e-6).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let job_id = backend.submit(&circuit, 100_000).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();

        let survival = result.counts.get("1") as f64 / 100_000.0;
        let expected = (-1.0_f64).exp();
        assert!((survival - expected).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_readout_error_floor() {
        let backend =
            SimulatorBackend::new(vec![QubitModel::new().with_readout_error(0.05, 0.0)])
                .with_seed(3);

        let mut circuit = Circuit::new("idle", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let job_id = backend.submit(&circuit, 100_000).await.unwrap();
        let result = backend.result(&job_id).await.unwrap();

        let excited = result.counts.get("1") as f64 / 100_000.0;
        assert!((excited - 0.05).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let circuit = x_circuit();

        let mut counts = vec![];
        for _ in 0..2 {
            let backend =
                SimulatorBackend::new(vec![QubitModel::new().with_readout_error(0.1, 0.1)])
                    .with_seed(99);
            let job_id = backend.submit(&circuit, 500).await.unwrap();
            counts.push(backend.result(&job_id).await.unwrap().counts);
        }
        assert_eq!(counts[0], counts[1]);
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let backend = SimulatorBackend::ideal(1);
        assert!(matches!(
            backend.submit(&x_circuit(), 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::ideal(1);
        assert!(matches!(
            backend.status(&JobId::new("missing")).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_too_many_qubits() {
        let backend = SimulatorBackend::ideal(1);
        let circuit = Circuit::new("wide", 4, 0);
        assert!(matches!(
            backend.submit(&circuit, 100).await,
            Err(HalError::InvalidCircuit(_))
        ));
    }
}
