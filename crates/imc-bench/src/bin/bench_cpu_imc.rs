// SPDX-License-Identifier: AGPL-3.0-only

//! bench_cpu_imc — CPU reference vs ReRAM crossbar inference, head to head.
//!
//! Runs the quantized two-layer MLP over a synthetic test set on the
//! simulated device, twice per image: once as a plain CPU dot product,
//! once tiled through the 8×8 crossbar. Prints the device's console
//! output verbatim, then the per-phase cycle breakdown the observer
//! reconstructed from the marker stream.
//!
//! Usage:
//!   cargo run --bin bench_cpu_imc
//!   cargo run --bin bench_cpu_imc -- --samples 100
//!   cargo run --bin bench_cpu_imc -- --seed 7 --settle 0
//!   cargo run --bin bench_cpu_imc -- --verbose

use anyhow::{bail, Result};
use imc_bench::{run_sim_benchmark, BenchOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let mut opts = BenchOptions::default();
    let mut verbose = false;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--verbose" => verbose = true,
            "--samples" => {
                i += 1;
                opts.samples = next_value(&args, i, "--samples")?.parse()?;
            }
            "--seed" => {
                i += 1;
                let seed: u64 = next_value(&args, i, "--seed")?.parse()?;
                opts.model_seed = seed;
                opts.data_seed = seed.wrapping_add(1);
            }
            "--settle" => {
                i += 1;
                opts.settle_cycles = next_value(&args, i, "--settle")?.parse()?;
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let (summary, report, console) = run_sim_benchmark(&opts);

    print!("{console}");
    print!("{}", report.render());

    let n = summary.results.len();
    if summary.agreement_count() != n {
        bail!(
            "CPU and IMC disagreed on {} of {n} samples",
            n - summary.agreement_count()
        );
    }
    Ok(())
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}
