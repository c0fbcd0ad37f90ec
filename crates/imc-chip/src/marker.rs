//! Textual marker protocol for cycle-accurate phase timing.
//!
//! The device firmware has no timing side channel; it only prints. An
//! external observer that timestamps every byte on the UART stream can
//! still reconstruct exact per-phase cycle counts from control lines of
//! the form:
//!
//! ```text
//! @@START_LAYER1
//! ...any amount of ordinary output...
//! @@END_LAYER1
//! ```
//!
//! A phase's duration is the cycle of its END line minus the cycle of its
//! START line, defined only when both markers were observed. Emitting the
//! same marker twice overwrites the earlier timestamp (last-write-wins);
//! well-formed runs emit each marker at most once.

/// Prefix of a phase-start control line.
pub const START_PREFIX: &str = "@@START_";

/// Prefix of a phase-end control line.
pub const END_PREFIX: &str = "@@END_";

/// The fixed set of timed phases, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Input image staged into the activation buffer.
    Prepare,
    /// First layer matrix-vector multiply.
    Layer1,
    /// Bias add, ReLU, requantize to signed 8-bit.
    Relu,
    /// Second layer matrix-vector multiply and bias add.
    Layer2,
    /// Class selection over the final scores.
    Argmax,
    /// Whole inference, Prepare through Argmax.
    Total,
}

impl Phase {
    /// All phases in report order (`Total` last, as in the breakdown table).
    pub const ALL: [Phase; 6] = [
        Phase::Prepare,
        Phase::Layer1,
        Phase::Relu,
        Phase::Layer2,
        Phase::Argmax,
        Phase::Total,
    ];

    /// Wire name used in marker lines (`@@START_<name>`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Prepare => "PREPARE",
            Phase::Layer1 => "LAYER1",
            Phase::Relu => "RELU",
            Phase::Layer2 => "LAYER2",
            Phase::Argmax => "ARGMAX",
            Phase::Total => "TOTAL",
        }
    }

    /// Human-readable label for the breakdown table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Prepare => "Prepare input:",
            Phase::Layer1 => "Layer 1:",
            Phase::Relu => "ReLU:",
            Phase::Layer2 => "Layer 2:",
            Phase::Argmax => "Argmax:",
            Phase::Total => "TOTAL:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_unique_and_uppercase() {
        for (i, a) in Phase::ALL.iter().enumerate() {
            assert_eq!(a.name(), a.name().to_uppercase());
            for b in &Phase::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn total_reports_last() {
        assert_eq!(*Phase::ALL.last().unwrap(), Phase::Total);
    }
}
