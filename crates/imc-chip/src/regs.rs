//! SoC peripheral register map.
//!
//! Offsets are word-aligned byte addresses within the peripheral aperture,
//! matching the RTL memory decoder:
//!
//! ```text
//! 0x100: UART_TX        — write-only byte console (low 8 bits of the word)
//! 0x300: CYCLE_COUNTER  — free-running 32-bit cycle counter, read-only
//! 0x400: IMC_PROG_DATA  — conductance byte latch
//! 0x404: IMC_PROG_ADDR  — flat cell index 0–63; the write commits the cell
//! 0x408: IMC_VIN_LO     — input lanes 0–3, little-endian packed
//! 0x40C: IMC_VIN_HI     — input lanes 4–7, little-endian packed
//! 0x410: IMC_RESULT[0]  — biased row read-back, eight consecutive words
//! ```
//!
//! Programming a cell is a two-register handshake: write the conductance
//! value to [`IMC_PROG_DATA`], then the cell index to [`IMC_PROG_ADDR`].
//! Result ports are valid only after the settle delay following the most
//! recent input-port write (see [`crate::tile::SETTLE_CYCLES`]).

// ── Console ──────────────────────────────────────────────────────────────────

/// UART transmit register. Write-only; one character per word write.
pub const UART_TX: usize = 0x100;

// ── Timing ───────────────────────────────────────────────────────────────────

/// Free-running cycle counter, incremented every core clock. Read-only.
pub const CYCLE_COUNTER: usize = 0x300;

// ── IMC crossbar block ───────────────────────────────────────────────────────

/// Conductance value latch for cell programming.
pub const IMC_PROG_DATA: usize = 0x400;

/// Cell index port (0–63). Writing here commits the latched conductance.
pub const IMC_PROG_ADDR: usize = 0x404;

/// Input vector lanes 0–3, packed little-endian (lane 0 in bits 7:0).
pub const IMC_VIN_LO: usize = 0x408;

/// Input vector lanes 4–7, packed little-endian (lane 4 in bits 7:0).
pub const IMC_VIN_HI: usize = 0x40C;

/// First of eight consecutive 32-bit row result ports.
pub const IMC_RESULT_BASE: usize = 0x410;

/// Number of row result ports.
pub const IMC_RESULT_COUNT: usize = 8;

/// Byte offset of the result port for one tile row.
#[must_use]
pub const fn result(row: usize) -> usize {
    IMC_RESULT_BASE + row * 4
}
