//! Inference pipeline — two interchangeable execution strategies.
//!
//! Both strategies run the same quantized two-layer network over the same
//! input and must agree on every prediction:
//!
//! - [`CpuStrategy`] — direct double-loop dot products, no tiling. The
//!   reference implementation.
//! - [`ImcStrategy`] — delegates both matrix-vector multiplies to the
//!   tiled crossbar executor.
//!
//! The stages (prepare → layer1 → requant → layer2 → argmax) are exposed
//! individually so the benchmark harness can wrap timing markers around
//! each phase; [`InferenceStrategy::infer`] composes them.
//!
//! ## Cycle cost model
//!
//! Host-side arithmetic is charged to the backend's simulated clock at
//! scalar in-order core rates (loads + multiply-accumulate per MAC, a few
//! ops per element of post-processing). On real hardware these charges are
//! no-ops — the free-running counter already measures host time.

use crate::quant::QuantizedMlp;
use imc_driver::{run_layer, CrossbarBackend};

/// Cycles per scalar multiply-accumulate (two loads, mul, add).
const CPU_MAC_CYCLES: u64 = 4;

/// Cycles per element of bias/ReLU/rescale/compare post-processing.
const CPU_ELEM_CYCLES: u64 = 4;

/// Cycles per byte staged into the activation buffer.
const CPU_COPY_CYCLES: u64 = 1;

/// One inference execution strategy over a shared backend.
///
/// The backend is passed per stage rather than owned: both strategies and
/// the harness time-share the single device within one benchmark run.
pub trait InferenceStrategy<B: CrossbarBackend + ?Sized> {
    /// Strategy name for report rows.
    fn name(&self) -> &'static str;

    /// Stage the input image into the activation buffer.
    fn prepare(&mut self, backend: &mut B, image: &[u8]);

    /// Input → hidden matrix-vector multiply into the i32 accumulator.
    fn layer1(&mut self, backend: &mut B);

    /// Bias add, ReLU, truncating rescale, clamp to `[0, 127]`.
    fn requant(&mut self, backend: &mut B);

    /// Hidden → output matrix-vector multiply plus bias add.
    fn layer2(&mut self, backend: &mut B);

    /// Select the class of maximum score (lowest index wins ties).
    fn argmax(&self, backend: &mut B) -> usize;

    /// Run a full inference: all stages in order.
    fn infer(&mut self, backend: &mut B, image: &[u8]) -> usize {
        self.prepare(backend, image);
        self.layer1(backend);
        self.requant(backend);
        self.layer2(backend);
        self.argmax(backend)
    }
}

/// First-occurrence argmax: keeps the current best on ties (strict `>`).
#[must_use]
pub fn argmax(scores: &[i32]) -> usize {
    let mut best = 0;
    for i in 1..scores.len() {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    best
}

/// Shared post-layer-1 activation: bias, ReLU, divide, upper clamp.
///
/// ReLU already removed negatives, so only the upper bound needs
/// clamping — but that bound is checked exactly at 127.
fn requant_into(acc: &[i32], bias: &[i32], h_div: i32, out: &mut [i8]) {
    for i in 0..acc.len() {
        let mut v = acc[i] + bias[i];
        if v < 0 {
            v = 0;
        }
        v /= h_div;
        out[i] = if v > 127 { 127 } else { v as i8 };
    }
}

fn matvec_u8(w: &[i8], input: &[u8], out: &mut [i32], rows: usize, cols: usize) {
    for r in 0..rows {
        let mut acc = 0i32;
        for c in 0..cols {
            acc += i32::from(w[r * cols + c]) * i32::from(input[c]);
        }
        out[r] = acc;
    }
}

fn matvec_i8(w: &[i8], input: &[i8], out: &mut [i32], rows: usize, cols: usize) {
    for r in 0..rows {
        let mut acc = 0i32;
        for c in 0..cols {
            acc += i32::from(w[r * cols + c]) * i32::from(input[c]);
        }
        out[r] = acc;
    }
}

/// Direct CPU reference strategy.
#[derive(Debug)]
pub struct CpuStrategy<'m> {
    model: &'m QuantizedMlp,
    image: Vec<u8>,
    hidden_acc: Vec<i32>,
    hidden_act: Vec<i8>,
    output_acc: Vec<i32>,
}

impl<'m> CpuStrategy<'m> {
    /// Create a strategy with caller-scoped buffers sized from the model.
    #[must_use]
    pub fn new(model: &'m QuantizedMlp) -> Self {
        Self {
            model,
            image: vec![0; model.input_size()],
            hidden_acc: vec![0; model.hidden_size()],
            hidden_act: vec![0; model.hidden_size()],
            output_acc: vec![0; model.output_size()],
        }
    }

    /// Final raw scores after `layer2`.
    #[must_use]
    pub fn scores(&self) -> &[i32] {
        &self.output_acc
    }
}

impl<'m, B: CrossbarBackend + ?Sized> InferenceStrategy<B> for CpuStrategy<'m> {
    fn name(&self) -> &'static str {
        "CPU"
    }

    fn prepare(&mut self, backend: &mut B, image: &[u8]) {
        self.image.copy_from_slice(image);
        backend.advance(image.len() as u64 * CPU_COPY_CYCLES);
    }

    fn layer1(&mut self, backend: &mut B) {
        let m = self.model;
        matvec_u8(
            m.w1(),
            &self.image,
            &mut self.hidden_acc,
            m.hidden_size(),
            m.input_size(),
        );
        backend.advance((m.hidden_size() * m.input_size()) as u64 * CPU_MAC_CYCLES);
    }

    fn requant(&mut self, backend: &mut B) {
        let m = self.model;
        requant_into(&self.hidden_acc, m.b1(), m.h_div(), &mut self.hidden_act);
        backend.advance(m.hidden_size() as u64 * CPU_ELEM_CYCLES);
    }

    fn layer2(&mut self, backend: &mut B) {
        let m = self.model;
        matvec_i8(
            m.w2(),
            &self.hidden_act,
            &mut self.output_acc,
            m.output_size(),
            m.hidden_size(),
        );
        for (out, &b) in self.output_acc.iter_mut().zip(m.b2()) {
            *out += b;
        }
        backend
            .advance((m.output_size() * (m.hidden_size() + 1)) as u64 * CPU_MAC_CYCLES);
    }

    fn argmax(&self, backend: &mut B) -> usize {
        backend.advance(self.output_acc.len() as u64 * CPU_ELEM_CYCLES);
        argmax(&self.output_acc)
    }
}

/// Tiled-crossbar strategy: both layers run on the IMC accelerator.
#[derive(Debug)]
pub struct ImcStrategy<'m> {
    model: &'m QuantizedMlp,
    image: Vec<u8>,
    hidden_acc: Vec<i32>,
    hidden_act: Vec<i8>,
    output_acc: Vec<i32>,
}

impl<'m> ImcStrategy<'m> {
    /// Create a strategy with caller-scoped buffers sized from the model.
    #[must_use]
    pub fn new(model: &'m QuantizedMlp) -> Self {
        Self {
            model,
            image: vec![0; model.input_size()],
            hidden_acc: vec![0; model.hidden_size()],
            hidden_act: vec![0; model.hidden_size()],
            output_acc: vec![0; model.output_size()],
        }
    }

    /// Final raw scores after `layer2`.
    #[must_use]
    pub fn scores(&self) -> &[i32] {
        &self.output_acc
    }
}

impl<'m, B: CrossbarBackend + ?Sized> InferenceStrategy<B> for ImcStrategy<'m> {
    fn name(&self) -> &'static str {
        "IMC"
    }

    fn prepare(&mut self, backend: &mut B, image: &[u8]) {
        self.image.copy_from_slice(image);
        backend.advance(image.len() as u64 * CPU_COPY_CYCLES);
    }

    fn layer1(&mut self, backend: &mut B) {
        let m = self.model;
        self.hidden_acc =
            run_layer(backend, m.w1(), &self.image, m.hidden_size(), m.input_size());
    }

    fn requant(&mut self, backend: &mut B) {
        let m = self.model;
        requant_into(&self.hidden_acc, m.b1(), m.h_div(), &mut self.hidden_act);
        backend.advance(m.hidden_size() as u64 * CPU_ELEM_CYCLES);
    }

    fn layer2(&mut self, backend: &mut B) {
        let m = self.model;
        // Requant clamps activations to [0, 127], so the unsigned
        // reinterpretation the crossbar needs is exact.
        let hidden_u8: Vec<u8> = self.hidden_act.iter().map(|&v| v as u8).collect();
        self.output_acc =
            run_layer(backend, m.w2(), &hidden_u8, m.output_size(), m.hidden_size());
        for (out, &b) in self.output_acc.iter_mut().zip(m.b2()) {
            *out += b;
        }
        backend.advance(m.output_size() as u64 * CPU_ELEM_CYCLES);
    }

    fn argmax(&self, backend: &mut B) -> usize {
        backend.advance(self.output_acc.len() as u64 * CPU_ELEM_CYCLES);
        argmax(&self.output_acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::QuantizedMlp;
    use crate::synth::TestSet;
    use imc_driver::SimBackend;

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[5, 5, 3]), 0);
        assert_eq!(argmax(&[1, 9, 9, 2]), 1);
        assert_eq!(argmax(&[-3]), 0);
    }

    #[test]
    fn requant_clamps_upper_bound_at_127() {
        // 130 after divide clamps to 127.
        let acc = [130, 127, 0];
        let bias = [0, 0, 0];
        let mut out = [0i8; 3];
        requant_into(&acc, &bias, 1, &mut out);
        assert_eq!(out, [127, 127, 0]);
    }

    #[test]
    fn requant_relu_runs_before_divide() {
        // -40 clamps to 0 before the division, not after.
        let acc = [-40, -1];
        let bias = [0, 0];
        let mut out = [0i8; 2];
        requant_into(&acc, &bias, 7, &mut out);
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn requant_division_truncates() {
        let acc = [9, 10, 19];
        let bias = [0, 0, 0];
        let mut out = [0i8; 3];
        requant_into(&acc, &bias, 10, &mut out);
        assert_eq!(out, [0, 1, 1]);
    }

    #[test]
    fn cpu_and_imc_scores_identical() {
        let model = QuantizedMlp::synthetic(11);
        let set = TestSet::synthetic(13);
        let mut backend = SimBackend::new().with_settle_cycles(0);

        let mut cpu = CpuStrategy::new(&model);
        let mut imc = ImcStrategy::new(&model);

        for i in 0..set.len() {
            let p_cpu = cpu.infer(&mut backend, set.image(i));
            let p_imc = imc.infer(&mut backend, set.image(i));
            assert_eq!(cpu.scores(), imc.scores(), "sample {i}");
            assert_eq!(p_cpu, p_imc, "sample {i}");
        }
    }

    #[test]
    fn small_model_end_to_end() {
        // 3→2→2 network, worked by hand.
        let model = QuantizedMlp::new(
            3,
            2,
            2,
            vec![1, 0, -1, 2, 2, 2], // w1
            vec![10, -600],          // b1
            vec![1, 0, 0, 1],        // w2
            vec![0, 5],              // b2
            2,
        )
        .unwrap();
        let image = [100u8, 50, 10];
        // row0: 100 - 10 + 10 = 100 → /2 = 50;  row1: 320 - 600 → relu 0
        // out:  [50, 0 + 5] → argmax 0
        let mut backend = SimBackend::new().with_settle_cycles(0);

        let mut cpu = CpuStrategy::new(&model);
        assert_eq!(cpu.infer(&mut backend, &image), 0);
        assert_eq!(cpu.scores(), &[50, 5]);

        let mut imc = ImcStrategy::new(&model);
        assert_eq!(imc.infer(&mut backend, &image), 0);
        assert_eq!(imc.scores(), &[50, 5]);
    }
}
