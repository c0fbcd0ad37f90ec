//! One-call benchmark entry point over the simulated device.

use crate::harness::{BenchSummary, Harness};
use crate::observer::{MarkerScanner, PhaseReport};
use imc_driver::SimBackend;
use imc_models::{QuantizedMlp, TestSet, NUM_TEST_IMAGES};

/// Knobs for a simulated benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct BenchOptions {
    /// Seed for the synthetic weight tables.
    pub model_seed: u64,
    /// Seed for the synthetic test images.
    pub data_seed: u64,
    /// Number of test samples.
    pub samples: usize,
    /// Crossbar settle window in cycles.
    pub settle_cycles: u64,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            model_seed: 0xC0FFEE,
            data_seed: 0xDECAF,
            samples: NUM_TEST_IMAGES,
            settle_cycles: imc_chip::tile::SETTLE_CYCLES,
        }
    }
}

/// Run the profile pass and the benchmark loop on a fresh simulated
/// device, then replay the console stream through the observer.
///
/// Returns the benchmark summary, the reconstructed phase breakdown,
/// and the full console text the device printed.
#[must_use]
pub fn run_sim_benchmark(opts: &BenchOptions) -> (BenchSummary, PhaseReport, String) {
    let model = QuantizedMlp::synthetic(opts.model_seed);
    let testset = TestSet::synthetic_n(opts.data_seed, opts.samples);
    let mut backend = SimBackend::new().with_settle_cycles(opts.settle_cycles);

    tracing::info!(
        samples = opts.samples,
        settle = opts.settle_cycles,
        "starting simulated benchmark"
    );

    let mut harness = Harness::new(&mut backend, &model, &testset);
    if !testset.is_empty() {
        harness.profile(0);
    }
    let summary = harness.run();

    let stream = backend.take_console_log();
    let mut scanner = MarkerScanner::new();
    scanner.scan(&stream);
    let report = PhaseReport::from_scanner(&scanner);
    let text = stream.iter().map(|&(_, b)| char::from(b)).collect();

    (summary, report, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imc_chip::marker::Phase;

    #[test]
    fn defaults_produce_full_report() {
        let opts = BenchOptions {
            samples: 2,
            ..BenchOptions::default()
        };
        let (summary, report, text) = run_sim_benchmark(&opts);
        assert_eq!(summary.results.len(), 2);
        for phase in Phase::ALL {
            assert!(report.duration(phase).is_some(), "{phase:?} unmeasured");
        }
        assert!(text.contains("RESULTS:"));
    }
}
