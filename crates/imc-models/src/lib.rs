//! Quantized model and inference pipeline for the IMC benchmark.
//!
//! A two-layer int8 MLP (784 → 32 → 10) runs through two interchangeable
//! execution strategies — a direct CPU dot product and the tiled crossbar
//! path — over the same read-only weight tables and test images. The two
//! strategies are bit-exact equals; the benchmark exists to measure their
//! cycle costs and verify their agreement.
//!
//! # Example
//!
//! ```
//! use imc_driver::SimBackend;
//! use imc_models::{CpuStrategy, ImcStrategy, InferenceStrategy, QuantizedMlp, TestSet};
//!
//! let model = QuantizedMlp::synthetic(42);
//! let set = TestSet::synthetic(43);
//! let mut backend = SimBackend::new();
//!
//! let mut cpu = CpuStrategy::new(&model);
//! let mut imc = ImcStrategy::new(&model);
//! let image = set.image(0);
//! assert_eq!(cpu.infer(&mut backend, image), imc.infer(&mut backend, image));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

mod error;
mod pipeline;
mod quant;
mod synth;

pub use error::{ModelError, Result};
pub use pipeline::{argmax, CpuStrategy, ImcStrategy, InferenceStrategy};
pub use quant::{
    QuantizedMlp, HIDDEN_SIZE, INPUT_SIZE, NUM_TEST_IMAGES, OUTPUT_SIZE,
};
pub use synth::{TestSet, Xoshiro};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        argmax, CpuStrategy, ImcStrategy, InferenceStrategy, QuantizedMlp, TestSet,
    };
}
