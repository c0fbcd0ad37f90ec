//! End-to-end: device harness and marker observer over a full benchmark
//! run, coupled only through the cycle-stamped console stream.

use imc_bench::{run_sim_benchmark, BenchOptions, Harness, MarkerScanner, PhaseReport};
use imc_chip::marker::Phase;
use imc_driver::SimBackend;
use imc_models::{QuantizedMlp, TestSet, NUM_TEST_IMAGES};

#[test]
fn full_benchmark_agrees_on_every_sample() {
    let opts = BenchOptions::default();
    let (summary, _, _) = run_sim_benchmark(&opts);

    assert_eq!(summary.results.len(), NUM_TEST_IMAGES);
    assert_eq!(summary.agreement_count(), NUM_TEST_IMAGES);
}

#[test]
fn all_phases_measured_with_nonzero_total() {
    let (_, report, _) = run_sim_benchmark(&BenchOptions::default());

    for phase in Phase::ALL {
        assert!(report.duration(phase).is_some(), "{phase:?} unmeasured");
    }
    let total = report.duration(Phase::Total).unwrap();
    assert!(total > 0);

    // The stage phases partition the profiled inference; their sum cannot
    // exceed the outer TOTAL span.
    let stages: u64 = [
        Phase::Prepare,
        Phase::Layer1,
        Phase::Relu,
        Phase::Layer2,
        Phase::Argmax,
    ]
    .iter()
    .map(|&p| report.duration(p).unwrap())
    .sum();
    assert!(stages <= total);
}

#[test]
fn layer1_dominates_the_breakdown() {
    // 784 inputs × 32 hidden vs 32 × 10: layer 1 has two orders of
    // magnitude more tiles to program.
    let (_, report, _) = run_sim_benchmark(&BenchOptions::default());
    let l1 = report.duration(Phase::Layer1).unwrap();
    let l2 = report.duration(Phase::Layer2).unwrap();
    assert!(l1 > l2 * 10, "layer1={l1} layer2={l2}");
}

#[test]
fn settle_window_moves_total_cycles() {
    let fast = run_sim_benchmark(&BenchOptions {
        settle_cycles: 0,
        ..BenchOptions::default()
    });
    let slow = run_sim_benchmark(&BenchOptions {
        settle_cycles: 50,
        ..BenchOptions::default()
    });
    let fast_total = fast.1.duration(Phase::Total).unwrap();
    let slow_total = slow.1.duration(Phase::Total).unwrap();
    assert!(slow_total > fast_total);
}

#[test]
fn observer_sees_only_the_byte_stream() {
    // Reconstruct phase timings from a stream scanned byte by byte, with
    // no access to the harness or backend internals.
    let model = QuantizedMlp::synthetic(11);
    let set = TestSet::synthetic_n(12, 1);
    let mut backend = SimBackend::new();
    Harness::new(&mut backend, &model, &set).profile(0);

    let stream = backend.take_console_log();
    let mut scanner = MarkerScanner::new();
    for &(cycle, byte) in &stream {
        scanner.push(byte, cycle);
    }
    let report = PhaseReport::from_scanner(&scanner);
    assert!(report.duration(Phase::Layer1).unwrap() > 0);
    assert!(report.render().contains("Layer 1:"));
}

#[test]
fn benchmark_table_lists_every_sample() {
    let opts = BenchOptions {
        samples: 3,
        ..BenchOptions::default()
    };
    let (_, _, console) = run_sim_benchmark(&opts);

    assert!(console.contains("Image | Label"));
    for i in 0..3 {
        assert!(console.contains(&format!("  {i}   |")), "row {i} missing");
    }
    assert!(console.contains("Agreement:    3/3"));
}

#[test]
fn run_is_deterministic() {
    let a = run_sim_benchmark(&BenchOptions::default());
    let b = run_sim_benchmark(&BenchOptions::default());
    assert_eq!(a.2, b.2);
    for phase in Phase::ALL {
        assert_eq!(a.1.duration(phase), b.1.duration(phase));
    }
}

#[test]
fn console_survives_marker_lines_interleaved() {
    // Marker lines and human-readable output share one channel; neither
    // corrupts the other.
    let model = QuantizedMlp::synthetic(21);
    let set = TestSet::synthetic_n(22, 2);
    let mut backend = SimBackend::new();
    {
        let mut harness = Harness::new(&mut backend, &model, &set);
        harness.profile(0);
        harness.run();
    }

    let text = backend.console_text();
    assert!(text.contains("@@START_TOTAL"));
    assert!(text.contains("RESULTS:"));
}
