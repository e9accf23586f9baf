//! T1 relaxation demo: scan delays on a simulated noisy qubit and fit the
//! decay.
//!
//! ```text
//! cargo run --bin demo-t1 -- --t1-us 25 --shots 10000
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alsvid_adapter_sim::{QubitModel, SimulatorBackend};
use alsvid_experiments::{run_experiment, T1};

#[derive(Parser)]
#[command(about = "Run a simulated T1 relaxation experiment")]
struct Args {
    /// True relaxation time of the simulated qubit, in microseconds.
    #[arg(long, default_value_t = 25.0)]
    t1_us: f64,

    /// Shots per scan point.
    #[arg(long, default_value_t = 10_000)]
    shots: u32,

    /// Symmetric readout error probability.
    #[arg(long, default_value_t = 0.02)]
    readout_error: f64,

    /// Seed for the shot sampler.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let true_t1 = args.t1_us * 1e-6;

    let model = QubitModel::new()
        .with_t1(true_t1)
        .with_readout_error(args.readout_error, args.readout_error);
    let mut backend = SimulatorBackend::new(vec![model]);
    if let Some(seed) = args.seed {
        backend = backend.with_seed(seed);
    }

    let delays: Vec<f64> = (0..13).map(|i| 1e-6 + 3e-6 * i as f64).collect();
    info!(true_t1, points = delays.len(), "starting T1 scan");

    let data = run_experiment(&T1::new(0, delays), &backend, args.shots).await?;

    let result = data
        .analysis_result("T1")
        .expect("T1 analysis always reports a result");

    println!("T1 experiment {}", data.experiment_id);
    match result.value {
        Some(value) => {
            println!(
                "  T1      = {:.3} us  (stderr {})",
                value.value * 1e6,
                value
                    .stderr
                    .map_or("n/a".to_string(), |e| format!("{:.3} us", e * 1e6)),
            );
        }
        None => println!("  T1      = <fit failed>"),
    }
    if let Some(chisq) = result.reduced_chisq {
        println!("  chi2/dof = {chisq:.3}");
    }
    println!("  quality = {}", result.quality);

    Ok(())
}
