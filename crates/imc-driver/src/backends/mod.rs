//! Crossbar backend implementations.
//!
//! | Backend | Use case |
//! |---------|----------|
//! | [`SimBackend`] | Deterministic in-process emulation; CI, tests, benchmarks |
//! | [`MmioBackend`] | Real peripheral aperture over memory-mapped I/O |

pub mod mmio;
pub mod sim;

pub use mmio::MmioBackend;
pub use sim::SimBackend;
