//! Frequency calibration demo: detect a simulated detuning with a Ramsey
//! XY scan and write the corrected frequency to the calibration store.
//!
//! ```text
//! cargo run --bin demo-frequency-cal -- --detuning-khz 500
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alsvid_adapter_sim::{QubitModel, SimulatorBackend};
use alsvid_cal::{Calibrations, DEFAULT_GROUP};
use alsvid_experiments::{FrequencyCal, QUBIT_LO_FREQ};

#[derive(Parser)]
#[command(about = "Run a simulated qubit-frequency calibration")]
struct Args {
    /// Simulated detuning of the qubit from the drive frame, in kHz.
    #[arg(long, default_value_t = 500.0)]
    detuning_khz: f64,

    /// Imparted oscillation frequency, in MHz.
    #[arg(long, default_value_t = 2.0)]
    osc_freq_mhz: f64,

    /// Shots per scan point.
    #[arg(long, default_value_t = 10_000)]
    shots: u32,

    /// Skip the store write and only report the fit.
    #[arg(long)]
    no_update: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let detuning = args.detuning_khz * 1e3;
    let osc_freq = args.osc_freq_mhz * 1e6;
    let nominal_freq = 5.0e9;

    let mut cals = Calibrations::new();
    cals.add_parameter_value(QUBIT_LO_FREQ, &[0], DEFAULT_GROUP, nominal_freq, None)?;

    let model = QubitModel::new()
        .with_t2(5e-6)
        .with_frequency_offset(detuning)
        .with_readout_error(0.02, 0.02);
    let backend = SimulatorBackend::new(vec![model]);

    let delays: Vec<f64> = (0..60).map(|i| i as f64 * 100e-9).collect();
    info!(detuning, osc_freq, "starting frequency calibration");

    let cal = FrequencyCal::new(0, delays)
        .with_osc_freq(osc_freq)
        .with_auto_update(!args.no_update);
    let data = cal.run(&backend, args.shots, &mut cals).await?;

    let result = data
        .analysis_result("Frequency")
        .expect("Ramsey XY always reports a frequency");

    println!("Frequency calibration {}", data.experiment_id);
    if let Some(value) = result.value {
        println!("  measured oscillation = {:.1} kHz", value.value / 1e3);
        println!(
            "  inferred detuning    = {:.1} kHz (true {:.1})",
            (value.value - osc_freq) / 1e3,
            detuning / 1e3
        );
    }
    println!("  quality              = {}", result.quality);

    let stored = cals.get_parameter_value(QUBIT_LO_FREQ, &[0], DEFAULT_GROUP)?;
    println!(
        "  stored frequency     = {:.6} GHz ({})",
        stored / 1e9,
        if args.no_update { "unchanged" } else { "updated" }
    );

    Ok(())
}
