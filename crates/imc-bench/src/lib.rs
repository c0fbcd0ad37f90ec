//! CPU-vs-IMC benchmark harness and marker-stream observer.
//!
//! Two halves that deliberately share nothing but a byte stream:
//!
//! * [`harness`] — the device side. Runs both inference strategies over a
//!   test set, prints results and `@@START_`/`@@END_` phase markers
//!   through the backend's console channel.
//! * [`observer`] — the host side. Replays the cycle-stamped console
//!   stream and reconstructs per-phase cycle counts from the markers
//!   alone, the way an external logic analyzer on the UART would.
//!
//! [`run::run_sim_benchmark`] wires the two together over a simulated
//! device for the `bench_cpu_imc` binary and the CLI.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod harness;
pub mod observer;
pub mod run;

pub use harness::{BenchSummary, Harness, SampleResult};
pub use observer::{MarkerScanner, PhaseReport};
pub use run::{run_sim_benchmark, BenchOptions};
