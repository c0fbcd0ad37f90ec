//! Device side of the benchmark.
//!
//! Runs every test sample through both inference strategies, samples the
//! cycle counter around each invocation, and prints one table row per
//! sample plus aggregate accuracy and mean cycle counts. All output goes
//! through the backend's console channel so an observer of the byte
//! stream sees exactly what a UART would carry — including the
//! `@@START_`/`@@END_` markers the profile pass emits around each
//! inference phase.

use imc_chip::marker::Phase;
use imc_driver::CrossbarBackend;
use imc_models::{CpuStrategy, ImcStrategy, InferenceStrategy, QuantizedMlp, TestSet};

/// Outcome of one benchmarked sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleResult {
    /// Sample index in the test set.
    pub index: usize,
    /// Ground-truth class label.
    pub label: usize,
    /// CPU strategy prediction.
    pub cpu_pred: usize,
    /// IMC strategy prediction.
    pub imc_pred: usize,
    /// Elapsed cycles for the CPU inference.
    pub cpu_cycles: u64,
    /// Elapsed cycles for the IMC inference.
    pub imc_cycles: u64,
}

impl SampleResult {
    /// Whether the two strategies agreed on the predicted class.
    #[must_use]
    pub fn agree(&self) -> bool {
        self.cpu_pred == self.imc_pred
    }
}

/// Aggregated benchmark outcome.
#[derive(Debug, Clone, Default)]
pub struct BenchSummary {
    /// Per-sample outcomes, in test-set order.
    pub results: Vec<SampleResult>,
}

impl BenchSummary {
    /// Samples where both strategies agreed.
    #[must_use]
    pub fn agreement_count(&self) -> usize {
        self.results.iter().filter(|r| r.agree()).count()
    }

    /// Samples where the CPU strategy matched the ground truth.
    #[must_use]
    pub fn cpu_correct(&self) -> usize {
        self.results.iter().filter(|r| r.cpu_pred == r.label).count()
    }

    /// Samples where the IMC strategy matched the ground truth.
    #[must_use]
    pub fn imc_correct(&self) -> usize {
        self.results.iter().filter(|r| r.imc_pred == r.label).count()
    }

    /// Mean elapsed cycles for the CPU strategy.
    #[must_use]
    pub fn mean_cpu_cycles(&self) -> u64 {
        self.mean(|r| r.cpu_cycles)
    }

    /// Mean elapsed cycles for the IMC strategy.
    #[must_use]
    pub fn mean_imc_cycles(&self) -> u64 {
        self.mean(|r| r.imc_cycles)
    }

    fn mean(&self, f: impl Fn(&SampleResult) -> u64) -> u64 {
        if self.results.is_empty() {
            return 0;
        }
        self.results.iter().map(f).sum::<u64>() / self.results.len() as u64
    }
}

/// Drives the benchmark over one backend, one model, and one test set.
#[derive(Debug)]
pub struct Harness<'a, B: CrossbarBackend + ?Sized> {
    backend: &'a mut B,
    model: &'a QuantizedMlp,
    testset: &'a TestSet,
}

impl<'a, B: CrossbarBackend + ?Sized> Harness<'a, B> {
    /// Attach the harness to its collaborators.
    pub fn new(backend: &'a mut B, model: &'a QuantizedMlp, testset: &'a TestSet) -> Self {
        Self {
            backend,
            model,
            testset,
        }
    }

    fn print(&mut self, s: &str) {
        for b in s.bytes() {
            self.backend.write_byte(b);
        }
    }

    fn marker_start(&mut self, phase: Phase) {
        self.print(&format!("@@START_{}\n", phase.name()));
    }

    fn marker_end(&mut self, phase: Phase) {
        self.print(&format!("@@END_{}\n", phase.name()));
    }

    /// Profile pass: run one representative sample through the IMC path
    /// with markers around every phase, so the observer can reconstruct
    /// the per-phase breakdown from the byte stream alone.
    pub fn profile(&mut self, sample: usize) {
        let image = self.testset.image(sample).to_vec();
        let mut imc = ImcStrategy::new(self.model);

        self.marker_start(Phase::Total);

        self.marker_start(Phase::Prepare);
        imc.prepare(&mut *self.backend, &image);
        self.marker_end(Phase::Prepare);

        self.marker_start(Phase::Layer1);
        imc.layer1(&mut *self.backend);
        self.marker_end(Phase::Layer1);

        self.marker_start(Phase::Relu);
        imc.requant(&mut *self.backend);
        self.marker_end(Phase::Relu);

        self.marker_start(Phase::Layer2);
        imc.layer2(&mut *self.backend);
        self.marker_end(Phase::Layer2);

        self.marker_start(Phase::Argmax);
        let pred = imc.argmax(&mut *self.backend);
        self.marker_end(Phase::Argmax);

        self.marker_end(Phase::Total);
        tracing::debug!(sample, pred, "profile pass complete");
    }

    /// Benchmark loop: both strategies over every sample, tabulated.
    pub fn run(&mut self) -> BenchSummary {
        let mut cpu = CpuStrategy::new(self.model);
        let mut imc = ImcStrategy::new(self.model);
        let mut summary = BenchSummary::default();

        self.print("\n========================================================\n");
        self.print(" CPU vs ReRAM IMC (8x8) Inference Benchmark\n");
        self.print("========================================================\n\n");
        self.print("Image | Label | CPU Cycles   | IMC Cycles   | Match?\n");
        self.print("--------------------------------------------------------\n");

        for index in 0..self.testset.len() {
            let image = self.testset.image(index).to_vec();
            let label = self.testset.label(index);

            let t0 = self.backend.cycles();
            let cpu_pred = cpu.infer(&mut *self.backend, &image);
            let cpu_cycles = self.backend.cycles() - t0;

            let t0 = self.backend.cycles();
            let imc_pred = imc.infer(&mut *self.backend, &image);
            let imc_cycles = self.backend.cycles() - t0;

            let result = SampleResult {
                index,
                label,
                cpu_pred,
                imc_pred,
                cpu_cycles,
                imc_cycles,
            };
            self.print(&format!(
                "  {index}   |   {label}   | {cpu_cycles:<12} | {imc_cycles:<12} | {}\n",
                if result.agree() { "YES" } else { "NO" }
            ));
            summary.results.push(result);
        }

        let n = summary.results.len();
        self.print("--------------------------------------------------------\n");
        self.print("\nRESULTS:\n");
        self.print(&format!("  CPU Accuracy: {}/{n}\n", summary.cpu_correct()));
        self.print(&format!("  IMC Accuracy: {}/{n}\n", summary.imc_correct()));
        self.print(&format!("  Agreement:    {}/{n}\n", summary.agreement_count()));
        self.print(&format!("  Avg CPU Cycles: {}\n", summary.mean_cpu_cycles()));
        self.print(&format!("  Avg IMC Cycles: {}\n", summary.mean_imc_cycles()));
        self.print("\n========================================================\n\n");

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imc_driver::SimBackend;

    #[test]
    fn all_samples_agree() {
        let model = QuantizedMlp::synthetic(1);
        let set = TestSet::synthetic_n(2, 4);
        let mut backend = SimBackend::new().with_settle_cycles(0);

        let summary = Harness::new(&mut backend, &model, &set).run();
        assert_eq!(summary.results.len(), 4);
        assert_eq!(summary.agreement_count(), 4);
    }

    #[test]
    fn cycle_counts_are_positive_and_imc_is_cheaper() {
        // One programmed tile amortizes 64 MACs; even with the per-tile
        // settle window the crossbar undercuts the 4-cycle scalar MAC.
        let model = QuantizedMlp::synthetic(5);
        let set = TestSet::synthetic_n(6, 1);
        let mut backend = SimBackend::new();

        let summary = Harness::new(&mut backend, &model, &set).run();
        let r = &summary.results[0];
        assert!(r.cpu_cycles > 0);
        assert!(r.imc_cycles > 0);
        assert!(r.imc_cycles < r.cpu_cycles);
    }

    #[test]
    fn profile_emits_all_marker_pairs() {
        let model = QuantizedMlp::synthetic(9);
        let set = TestSet::synthetic_n(10, 1);
        let mut backend = SimBackend::new();

        Harness::new(&mut backend, &model, &set).profile(0);
        let text = backend.console_text();
        for phase in Phase::ALL {
            assert!(text.contains(&format!("@@START_{}", phase.name())), "{phase:?}");
            assert!(text.contains(&format!("@@END_{}", phase.name())), "{phase:?}");
        }
    }
}
