//! Driver for the 8×8 ReRAM IMC crossbar peripheral.
//!
//! The crossbar performs signed 8-bit matrix-vector multiplication in an
//! unsigned-conductance memory array. This crate provides the full stack
//! between that physical model and an inference pipeline:
//!
//! ```text
//! run_layer()           — arbitrary R×C matrix, tiled into 8×8 blocks
//!   TileMacUnit         — program → drive input → settle → read → correct
//!     CrossbarBackend   — capability interface (no address literals)
//!       SimBackend      — deterministic in-process model, cycle-counted
//!       MmioBackend     — real peripheral over memory-mapped I/O
//! ```
//!
//! # Quick start
//!
//! ```
//! use imc_driver::{backends::SimBackend, run_layer};
//!
//! let weights: Vec<i8> = vec![2, -3, 5, 7, -11, 13]; // 2×3
//! let input: Vec<u8> = vec![10, 20, 30];
//!
//! let mut backend = SimBackend::new();
//! let acc = run_layer(&mut backend, &weights, &input, 2, 3);
//! assert_eq!(acc, vec![2 * 10 - 3 * 20 + 5 * 30, 7 * 10 - 11 * 20 + 13 * 30]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod backend;
pub mod backends;
mod error;
mod layer;
mod tile;

pub use backend::{select_backend, BackendSelection, BackendType, CrossbarBackend};
pub use backends::{MmioBackend, SimBackend};
pub use error::{ImcError, Result};
pub use layer::run_layer;
pub use tile::TileMacUnit;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        run_layer, select_backend, BackendSelection, CrossbarBackend, ImcError, Result,
        SimBackend, TileMacUnit,
    };
}
