//! `imc` — command-line interface for the ReRAM IMC crossbar.
//!
//! ```text
//! USAGE:
//!   imc bench [--samples N] [--seed S] [--settle C]   Run the CPU-vs-IMC benchmark
//!   imc info                                          Print the device model
//!   imc probe [--device PATH] [--backend auto|mmio]   Try to attach a backend
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use imc_bench::{run_sim_benchmark, BenchOptions};
use imc_driver::{select_backend, BackendSelection};

#[derive(Parser)]
#[command(name = "imc", about = "ReRAM in-memory-computing crossbar CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the CPU-vs-IMC inference benchmark on the simulated device.
    Bench {
        /// Number of test images.
        #[arg(long)]
        samples: Option<usize>,
        /// Seed for the synthetic model and test set.
        #[arg(long)]
        seed: Option<u64>,
        /// Crossbar settle window in cycles.
        #[arg(long)]
        settle: Option<u64>,
    },
    /// Print the crossbar geometry and peripheral register map.
    Info,
    /// Attach a backend and report which one was selected.
    Probe {
        /// Device node exposing the peripheral aperture.
        #[arg(long, default_value = "/dev/imc0")]
        device: PathBuf,
        /// Backend selection strategy.
        #[arg(long, value_enum, default_value_t = Backend::Auto)]
        backend: Backend,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Auto,
    Sim,
    Mmio,
}

impl From<Backend> for BackendSelection {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Auto => BackendSelection::Auto,
            Backend::Sim => BackendSelection::Sim,
            Backend::Mmio => BackendSelection::Mmio,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Bench {
            samples,
            seed,
            settle,
        } => cmd_bench(samples, seed, settle)?,
        Cmd::Info => cmd_info(),
        Cmd::Probe { device, backend } => cmd_probe(&device, backend)?,
    }

    Ok(())
}

fn cmd_bench(samples: Option<usize>, seed: Option<u64>, settle: Option<u64>) -> Result<()> {
    let mut opts = BenchOptions::default();
    if let Some(n) = samples {
        opts.samples = n;
    }
    if let Some(s) = seed {
        opts.model_seed = s;
        opts.data_seed = s.wrapping_add(1);
    }
    if let Some(c) = settle {
        opts.settle_cycles = c;
    }

    let (summary, report, console) = run_sim_benchmark(&opts);
    print!("{console}");
    print!("{}", report.render());

    let n = summary.results.len();
    let agreed = summary.agreement_count();
    if agreed != n {
        bail!("CPU and IMC disagreed on {} of {n} samples", n - agreed);
    }
    Ok(())
}

fn cmd_info() {
    use imc_chip::{regs, tile};

    println!("ReRAM IMC crossbar");
    println!("==================");
    println!("Tile           : {}×{} cells", tile::TILE_DIM, tile::TILE_DIM);
    println!("Weight encoding: conductance = w + {}", tile::CONDUCTANCE_OFFSET);
    println!("Settle window  : {} cycles", tile::SETTLE_CYCLES);
    println!();
    println!("Peripheral register map:");
    println!("  {:#05x}  UART_TX", regs::UART_TX);
    println!("  {:#05x}  CYCLE_COUNTER", regs::CYCLE_COUNTER);
    println!("  {:#05x}  IMC_PROG_DATA", regs::IMC_PROG_DATA);
    println!("  {:#05x}  IMC_PROG_ADDR", regs::IMC_PROG_ADDR);
    println!("  {:#05x}  IMC_VIN_LO", regs::IMC_VIN_LO);
    println!("  {:#05x}  IMC_VIN_HI", regs::IMC_VIN_HI);
    println!(
        "  {:#05x}  IMC_RESULT[0..{}]",
        regs::IMC_RESULT_BASE,
        regs::IMC_RESULT_COUNT
    );
}

fn cmd_probe(device: &std::path::Path, backend: Backend) -> Result<()> {
    let attached = select_backend(backend.into(), device)?;
    println!("Attached backend: {}", attached.backend_type());
    Ok(())
}
