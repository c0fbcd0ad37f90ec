//! Deterministic synthetic model and test data.
//!
//! The benchmark's real weight tables are opaque post-training-quantization
//! artifacts; what the workspace measures — CPU/IMC agreement and cycle
//! counts — does not depend on them being trained. These generators
//! produce fixed-seed stand-ins with the same shapes and value ranges, so
//! every run of the benchmark is bit-for-bit reproducible.

use crate::quant::{QuantizedMlp, HIDDEN_SIZE, INPUT_SIZE, NUM_TEST_IMAGES, OUTPUT_SIZE};

/// Hidden-layer divisor sized so synthetic layer-1 accumulators land
/// mostly inside [0, 127] after rescale, with occasional clamping.
const SYNTH_H_DIV: i32 = 4096;

/// xoshiro256** — small, fast, reproducible PRNG.
pub struct Xoshiro {
    s: [u64; 4],
}

impl Xoshiro {
    /// Seed the generator; any seed is valid.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let s = [
            seed ^ 0x9e37_79b9_7f4a_7c15,
            seed.wrapping_add(0x6c62_272e_07bb_0142),
            seed.rotate_left(17),
            seed.rotate_right(5),
        ];
        let mut rng = Self { s };
        for _ in 0..20 {
            let _ = rng.next_u64();
        }
        rng
    }

    /// Next 64 random bits.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);
        let t = self.s[1].wrapping_shl(17);
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }

    /// Vector of signed 8-bit values over the full range.
    pub fn gen_i8(&mut self, len: usize) -> Vec<i8> {
        (0..len).map(|_| self.next_u64() as i8).collect()
    }

    /// Vector of unsigned 8-bit values over the full range.
    pub fn gen_u8(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_u64() as u8).collect()
    }

    /// Vector of signed 32-bit values bounded by `|v| <= bound`.
    pub fn gen_i32(&mut self, len: usize, bound: i32) -> Vec<i32> {
        let span = u64::from(bound.unsigned_abs()) * 2 + 1;
        (0..len)
            .map(|_| (self.next_u64() % span) as i32 - bound)
            .collect()
    }
}

impl QuantizedMlp {
    /// Deterministic synthetic model at the benchmark's standard shape
    /// (784 → 32 → 10).
    #[must_use]
    pub fn synthetic(seed: u64) -> Self {
        let mut rng = Xoshiro::new(seed);
        let w1 = rng.gen_i8(HIDDEN_SIZE * INPUT_SIZE);
        // Bias magnitudes comparable to a few dozen MAC terms.
        let b1 = rng.gen_i32(HIDDEN_SIZE, 200_000);
        let w2 = rng.gen_i8(OUTPUT_SIZE * HIDDEN_SIZE);
        let b2 = rng.gen_i32(OUTPUT_SIZE, 2_000);

        Self::new(
            INPUT_SIZE,
            HIDDEN_SIZE,
            OUTPUT_SIZE,
            w1,
            b1,
            w2,
            b2,
            SYNTH_H_DIV,
        )
        .expect("synthetic tables match the declared shape")
    }
}

/// A fixed ordered sequence of labeled test images.
#[derive(Debug, Clone)]
pub struct TestSet {
    images: Vec<Vec<u8>>,
    labels: Vec<u8>,
}

impl TestSet {
    /// Build a test set from parallel image and label sequences.
    #[must_use]
    pub fn new(images: Vec<Vec<u8>>, labels: Vec<u8>) -> Self {
        assert_eq!(images.len(), labels.len());
        Self { images, labels }
    }

    /// Deterministic synthetic set: one image per class label 0–9.
    #[must_use]
    pub fn synthetic(seed: u64) -> Self {
        Self::synthetic_n(seed, NUM_TEST_IMAGES)
    }

    /// Deterministic synthetic set of `n` samples, labels cycling 0–9.
    #[must_use]
    pub fn synthetic_n(seed: u64, n: usize) -> Self {
        let mut rng = Xoshiro::new(seed);
        let images = (0..n).map(|_| rng.gen_u8(INPUT_SIZE)).collect();
        let labels = (0..n).map(|d| (d % 10) as u8).collect();
        Self { images, labels }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Pixel data of one sample.
    pub fn image(&self, index: usize) -> &[u8] {
        &self.images[index]
    }

    /// Ground-truth class of one sample.
    pub fn label(&self, index: usize) -> usize {
        usize::from(self.labels[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_model() {
        let a = QuantizedMlp::synthetic(42);
        let b = QuantizedMlp::synthetic(42);
        assert_eq!(a.w1(), b.w1());
        assert_eq!(a.b2(), b.b2());
    }

    #[test]
    fn different_seed_different_model() {
        let a = QuantizedMlp::synthetic(1);
        let b = QuantizedMlp::synthetic(2);
        assert_ne!(a.w1(), b.w1());
    }

    #[test]
    fn synthetic_set_shape() {
        let set = TestSet::synthetic(7);
        assert_eq!(set.len(), NUM_TEST_IMAGES);
        assert_eq!(set.image(0).len(), INPUT_SIZE);
        assert_eq!(set.label(9), 9);
    }

    #[test]
    fn weights_cover_both_signs() {
        let m = QuantizedMlp::synthetic(3);
        assert!(m.w1().iter().any(|&w| w < 0));
        assert!(m.w1().iter().any(|&w| w > 0));
    }
}
