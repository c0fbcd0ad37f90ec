//! Backend abstraction for the IMC crossbar peripheral.
//!
//! The tile MAC unit and everything above it depend only on this
//! capability interface, never on address literals. A simulation backend
//! implements it in-process with a deterministic cycle model; the MMIO
//! backend implements it over the real memory-mapped aperture.

use crate::error::Result;
use std::fmt::Debug;
use std::path::Path;

use imc_chip::tile::TILE_DIM;

/// Capability interface to one programmable 8×8 crossbar tile plus the
/// SoC's cycle counter and console.
///
/// The physical model has a single tile, so a backend is exclusively
/// owned by the inference call in progress — no concurrent programming.
///
/// Protocol, in order: program cells, drive the input vector, wait for
/// settle, read rows. A row read issued after `set_input` but before
/// `wait_settle` returns whatever the result latches held before —
/// never trust a read that did not follow a completed settle.
pub trait CrossbarBackend: Debug {
    /// Program one conductance cell. `index` is the flat 0–63 cell address.
    fn program_cell(&mut self, index: u8, value: u8);

    /// Drive the 8-lane input vector. Invalidates previous read-back.
    fn set_input(&mut self, v: [u8; TILE_DIM]);

    /// Block until the crossbar has settled; row reads are valid after.
    fn wait_settle(&mut self);

    /// Read the biased raw accumulation for one tile row (0–7).
    fn read_row(&mut self, row: usize) -> u32;

    /// Sample the monotonic cycle counter.
    fn cycles(&mut self) -> u64;

    /// Retire `n` host instructions against the clock.
    ///
    /// The simulation backend advances its cycle counter so that host-side
    /// compute shows up in benchmarks; on real hardware the counter
    /// free-runs and this is a no-op.
    fn advance(&mut self, n: u64);

    /// Emit one byte on the console channel (UART).
    fn write_byte(&mut self, byte: u8);

    /// Backend identifier for logging.
    fn backend_type(&self) -> BackendType;
}

/// Backend type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-process cycle-counted simulation.
    Sim,
    /// Memory-mapped hardware aperture.
    Mmio,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sim => write!(f, "Sim (in-process crossbar model)"),
            Self::Mmio => write!(f, "MMIO (mapped aperture)"),
        }
    }
}

/// Backend selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// Use hardware when the aperture maps, otherwise fall back to Sim.
    Auto,
    /// Force the in-process simulation.
    Sim,
    /// Force the memory-mapped hardware aperture.
    Mmio,
}

/// Select a crossbar backend.
///
/// `aperture` is the device node exposing the peripheral aperture
/// (ignored by the Sim backend).
///
/// # Errors
///
/// Returns an error if a forced MMIO backend cannot map the aperture.
pub fn select_backend(
    selection: BackendSelection,
    aperture: &Path,
) -> Result<Box<dyn CrossbarBackend>> {
    use crate::backends::{MmioBackend, SimBackend};

    match selection {
        BackendSelection::Auto => {
            if let Ok(backend) = MmioBackend::map(aperture) {
                tracing::info!("Using MMIO backend at {}", aperture.display());
                return Ok(Box::new(backend));
            }
            tracing::info!("MMIO aperture unavailable, using simulation backend");
            Ok(Box::new(SimBackend::new()))
        }
        BackendSelection::Sim => Ok(Box::new(SimBackend::new())),
        BackendSelection::Mmio => MmioBackend::map(aperture)
            .map(|b| Box::new(b) as Box<dyn CrossbarBackend>),
    }
}
