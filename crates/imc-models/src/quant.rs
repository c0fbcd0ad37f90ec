//! Quantized two-layer MLP data model.
//!
//! Pure integer inference, no FPU:
//!
//! ```text
//! Layer 1:  acc[r] = Σ_c w1[r][c] · pixel[c]            (i8 × u8 → i32)
//!           h[r]   = clip(relu(acc[r] + b1[r]) / h_div, 0, 127)
//! Layer 2:  out[r] = Σ_c w2[r][c] · h[c] + b2[r]        (i8 × i8 → i32)
//!           pred   = argmax(out)
//! ```
//!
//! Weight matrices are row-major, one row per output neuron. All tables
//! are read-only after construction.

use crate::error::{ModelError, Result};

/// Pixels per input image (28×28 grayscale, flattened).
pub const INPUT_SIZE: usize = 784;

/// Hidden layer width.
pub const HIDDEN_SIZE: usize = 32;

/// Output classes.
pub const OUTPUT_SIZE: usize = 10;

/// Labeled images in the benchmark test set.
pub const NUM_TEST_IMAGES: usize = 10;

/// An int8-quantized two-layer MLP with int32 biases and a calibrated
/// hidden-layer rescale divisor.
#[derive(Debug, Clone)]
pub struct QuantizedMlp {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    w1: Vec<i8>,
    b1: Vec<i32>,
    w2: Vec<i8>,
    b2: Vec<i32>,
    h_div: i32,
}

impl QuantizedMlp {
    /// Build a model from its quantized tables.
    ///
    /// # Errors
    ///
    /// Returns an error if any table length disagrees with the declared
    /// layer shape, or if `h_div < 1`.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        w1: Vec<i8>,
        b1: Vec<i32>,
        w2: Vec<i8>,
        b2: Vec<i32>,
        h_div: i32,
    ) -> Result<Self> {
        if w1.len() != hidden_size * input_size {
            return Err(ModelError::shape_mismatch(
                "w1",
                w1.len(),
                hidden_size * input_size,
            ));
        }
        if b1.len() != hidden_size {
            return Err(ModelError::shape_mismatch("b1", b1.len(), hidden_size));
        }
        if w2.len() != output_size * hidden_size {
            return Err(ModelError::shape_mismatch(
                "w2",
                w2.len(),
                output_size * hidden_size,
            ));
        }
        if b2.len() != output_size {
            return Err(ModelError::shape_mismatch("b2", b2.len(), output_size));
        }
        if h_div < 1 {
            return Err(ModelError::InvalidDivisor { value: h_div });
        }

        tracing::debug!(
            "QuantizedMlp: {input_size}->{hidden_size}->{output_size}, h_div={h_div}"
        );

        Ok(Self {
            input_size,
            hidden_size,
            output_size,
            w1,
            b1,
            w2,
            b2,
            h_div,
        })
    }

    /// Input vector length.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Hidden layer width.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Number of output classes.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Layer 1 weights, `hidden_size × input_size` row-major.
    pub fn w1(&self) -> &[i8] {
        &self.w1
    }

    /// Layer 1 biases.
    pub fn b1(&self) -> &[i32] {
        &self.b1
    }

    /// Layer 2 weights, `output_size × hidden_size` row-major.
    pub fn w2(&self) -> &[i8] {
        &self.w2
    }

    /// Layer 2 biases.
    pub fn b2(&self) -> &[i32] {
        &self.b2
    }

    /// Hidden-layer rescale divisor (calibrated at quantization time).
    pub fn h_div(&self) -> i32 {
        self.h_div
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(h_div: i32) -> Result<QuantizedMlp> {
        QuantizedMlp::new(
            3,
            2,
            2,
            vec![1, 2, 3, 4, 5, 6],
            vec![0, 0],
            vec![1, 0, 0, 1],
            vec![0, 0],
            h_div,
        )
    }

    #[test]
    fn valid_shapes_accepted() {
        assert!(tiny(1).is_ok());
    }

    #[test]
    fn bad_weight_shape_rejected() {
        let err = QuantizedMlp::new(3, 2, 2, vec![1, 2], vec![0, 0], vec![0; 4], vec![0, 0], 1)
            .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { what: "w1", .. }));
    }

    #[test]
    fn zero_divisor_rejected() {
        assert!(matches!(
            tiny(0).unwrap_err(),
            ModelError::InvalidDivisor { value: 0 }
        ));
    }
}
