//! Silicon model for the ReRAM in-memory-computing (IMC) crossbar peripheral.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the silicon: the SoC register map, the 8×8 crossbar tile
//! geometry with its unsigned-conductance weight encoding, and the textual
//! marker protocol used for cycle-accurate phase timing over the UART.
//!
//! The physical model is a single programmable 8×8 crossbar of unsigned
//! 8-bit "conductance" cells. A signed weight `w` is stored as the
//! conductance `w + 128`, so the analog read-back of row `r` is biased:
//!
//! ```text
//! raw[r] = Σ_c (w[r][c] + 128) · v[c] = true_mac[r] + 128 · Σ_c v[c]
//! ```
//!
//! Subtracting `128 · sum_v` recovers the exact signed dot product — see
//! [`tile::correct`]. Every read from the crossbar is meaningless until
//! that correction is applied.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | SoC peripheral map — UART, cycle counter, IMC block offsets |
//! | [`tile`] | Tile geometry, conductance encoding, offset correction, port packing |
//! | [`marker`] | `@@START_` / `@@END_` phase-marker protocol constants |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod marker;
pub mod regs;
pub mod tile;
