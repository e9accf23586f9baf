//! Alsvid execution boundary
//!
//! This crate provides the interface between calibration experiments and
//! whatever executes their circuits: a local simulator, a cloud service, or
//! real control hardware.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//! - [`Counts::marginal`] for demultiplexing parallel-batch outcomes
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use alsvid_hal::Backend;
//! use alsvid_adapter_sim::SimulatorBackend;
//! use alsvid_ir::{Circuit, QubitId, ClbitId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut circuit = Circuit::new("x", 1, 1);
//!     circuit.x(QubitId(0))?;
//!     circuit.measure(QubitId(0), ClbitId(0))?;
//!
//!     let backend = SimulatorBackend::ideal(1);
//!     let job_id = backend.submit(&circuit, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("Results: {:?}", result.counts);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendConfig, BackendFactory};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
