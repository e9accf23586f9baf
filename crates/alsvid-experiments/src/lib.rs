//! Alsvid calibration experiments
//!
//! Calibration and characterization experiments for superconducting-qubit
//! processors: each experiment builds a family of circuits parametrized by
//! a scanned variable, submits them through the execution boundary, turns
//! the returned counts into processed populations, fits a physical model,
//! and records named results with an algorithmic quality label.
//!
//! # Experiments
//!
//! | Experiment | Scan | Model | Result |
//! |------------|------|-------|--------|
//! | [`T1`] | delay | exponential decay | relaxation time |
//! | [`T2Ramsey`] | delay | damped cosine | dephasing time, beat frequency |
//! | [`RamseyXY`] | delay | joint cos/sin quadratures | signed detuning |
//! | [`FineAmplitude`] | repetitions | error amplification | rotation error |
//! | [`HalfAngle`] | repetitions | error amplification | axis skew |
//! | [`FrequencyCal`] | delay | Ramsey XY + store update | qubit frequency |
//!
//! # Example
//!
//! ```ignore
//! use alsvid_experiments::{run_experiment, T1};
//! use alsvid_adapter_sim::{QubitModel, SimulatorBackend};
//!
//! let backend = SimulatorBackend::new(vec![QubitModel::new().with_t1(25e-6)]);
//! let delays: Vec<f64> = (0..13).map(|i| 1e-6 + 3e-6 * i as f64).collect();
//!
//! let data = run_experiment(&T1::new(0, delays), &backend, 10_000).await?;
//! let t1 = data.analysis_result("T1").unwrap();
//! println!("T1 = {:?} ({})", t1.value, t1.quality);
//! ```

pub mod calibration;
pub mod data;
pub mod error;
pub mod experiment;
pub mod fine_amplitude;
pub mod half_angle;
pub mod parallel;
pub mod processor;
pub mod ramsey;
pub mod run;
pub mod t1;

pub use calibration::{FrequencyCal, FrequencyUpdater, QUBIT_LO_FREQ};
pub use data::{AnalysisResult, CircuitResult, ExperimentData};
pub use error::{ExpResult, ExperimentError};
pub use experiment::{DelayUnit, Experiment};
pub use fine_amplitude::FineAmplitude;
pub use half_angle::HalfAngle;
pub use parallel::ParallelExperiment;
pub use processor::DataProcessor;
pub use ramsey::{RamseyXY, T2Ramsey, DEFAULT_OSC_FREQ};
pub use run::{analyze, run_experiment};
pub use t1::T1;
