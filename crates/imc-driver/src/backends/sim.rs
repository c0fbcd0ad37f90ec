// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation backend — in-process crossbar model.
//!
//! Implements [`CrossbarBackend`] with the same digital semantics as the
//! RTL: an 8×8 grid of unsigned conductances, two packed input ports, and
//! eight 32-bit result latches that become valid only after the settle
//! window. This enables:
//!
//! 1. **Bit-exact parity checking**: the tiled IMC path and the plain CPU
//!    path must agree on every prediction; any divergence is a regression.
//!
//! 2. **Deterministic cycle accounting**: every register access and the
//!    settle window advance a cycle counter by fixed costs, so benchmark
//!    numbers are reproducible across runs and machines.
//!
//! 3. **Observable console**: bytes written to the UART are logged with
//!    their emission cycle, giving the marker observer the same ordered,
//!    lossless stream a Verilator testbench would see on the wire.
//!
//! ## Settle modeling
//!
//! The state machine is explicit: program → drive input → settle → read.
//! `set_input` latches the vector and marks the result latches stale;
//! only `wait_settle` recomputes them. A read issued before the settle
//! completes returns the stale latches — the hardware race is modeled,
//! not hidden. Tests can substitute a zero-cost settle via
//! [`SimBackend::with_settle_cycles`] without touching correctness logic.

use crate::backend::{BackendType, CrossbarBackend};
use imc_chip::tile::{NEUTRAL_CONDUCTANCE, SETTLE_CYCLES, TILE_CELLS, TILE_DIM};
use tracing::debug;

/// Cycles charged per peripheral register access.
const REG_ACCESS_COST: u64 = 1;

/// In-process crossbar + SoC peripheral model.
#[derive(Debug)]
pub struct SimBackend {
    /// Conductance grid, row-major flat 0–63 cell space.
    grid: [u8; TILE_CELLS],
    /// Latched 8-lane input vector.
    input: [u8; TILE_DIM],
    /// Row result latches; stale between `set_input` and `wait_settle`.
    results: [u32; TILE_DIM],
    /// Whether the latches reflect the current input vector.
    settled: bool,
    /// Monotonic cycle counter.
    cycle: u64,
    /// Settle window length in cycles.
    settle_cycles: u64,
    /// Cycle-stamped UART output.
    console: Vec<(u64, u8)>,
}

impl SimBackend {
    /// Create a backend in its reset state: all cells neutral, counter zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: [NEUTRAL_CONDUCTANCE; TILE_CELLS],
            input: [0; TILE_DIM],
            results: [0; TILE_DIM],
            settled: false,
            cycle: 0,
            settle_cycles: SETTLE_CYCLES,
            console: Vec::new(),
        }
    }

    /// Override the settle window length (0 gives tests a free settle).
    #[must_use]
    pub fn with_settle_cycles(mut self, cycles: u64) -> Self {
        self.settle_cycles = cycles;
        self
    }

    /// Configured settle window length.
    #[must_use]
    pub fn settle_cycles(&self) -> u64 {
        self.settle_cycles
    }

    /// Whether the result latches reflect the current input vector.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Cycle-stamped console output, in emission order.
    #[must_use]
    pub fn console_log(&self) -> &[(u64, u8)] {
        &self.console
    }

    /// Drain the console log, leaving it empty.
    pub fn take_console_log(&mut self) -> Vec<(u64, u8)> {
        std::mem::take(&mut self.console)
    }

    /// Console output decoded as text (markers plus tabulated results).
    #[must_use]
    pub fn console_text(&self) -> String {
        self.console.iter().map(|&(_, b)| char::from(b)).collect()
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossbarBackend for SimBackend {
    fn program_cell(&mut self, index: u8, value: u8) {
        // Two-register handshake on hardware: PROG_DATA then PROG_ADDR.
        self.cycle += 2 * REG_ACCESS_COST;
        self.grid[index as usize % TILE_CELLS] = value;
    }

    fn set_input(&mut self, v: [u8; TILE_DIM]) {
        // VIN_LO + VIN_HI port writes; read-back is stale until settle.
        self.cycle += 2 * REG_ACCESS_COST;
        self.input = v;
        self.settled = false;
    }

    fn wait_settle(&mut self) {
        self.cycle += self.settle_cycles;
        for row in 0..TILE_DIM {
            let mut acc: u32 = 0;
            for col in 0..TILE_DIM {
                let g = u32::from(self.grid[row * TILE_DIM + col]);
                acc = acc.wrapping_add(g * u32::from(self.input[col]));
            }
            self.results[row] = acc;
        }
        self.settled = true;
        debug!(cycle = self.cycle, "crossbar settled");
    }

    fn read_row(&mut self, row: usize) -> u32 {
        assert!(row < TILE_DIM, "result port index out of bounds");
        self.cycle += REG_ACCESS_COST;
        self.results[row]
    }

    fn cycles(&mut self) -> u64 {
        let sampled = self.cycle;
        self.cycle += REG_ACCESS_COST;
        sampled
    }

    fn advance(&mut self, n: u64) {
        self.cycle += n;
    }

    fn write_byte(&mut self, byte: u8) {
        self.console.push((self.cycle, byte));
        self.cycle += REG_ACCESS_COST;
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Sim
    }
}
