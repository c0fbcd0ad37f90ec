//! Tile geometry and conductance arithmetic.
//!
//! The crossbar stores unsigned 8-bit conductances; signed weights are
//! offset by [`CONDUCTANCE_OFFSET`] before programming. The offset biases
//! every row read-back by `128 · sum_v`, where `sum_v` is the sum of the
//! eight (possibly zero-padded) input lanes. [`correct`] removes the bias:
//!
//! ```text
//! (w + 128) · x − 128 · x = w · x        for w ∈ [−128, 127], x ∈ [0, 255]
//! ```
//!
//! The subtrahend multiplier is always the *padded* lane sum, never the
//! logical column count — padded lanes carry zero input and therefore
//! contribute zero bias.

/// Crossbar edge length: one tile multiplies an 8×8 weight block.
pub const TILE_DIM: usize = 8;

/// Cells per tile (flat addressing space of `IMC_PROG_ADDR`).
pub const TILE_CELLS: usize = TILE_DIM * TILE_DIM;

/// Offset added to a signed weight to form its unsigned conductance.
pub const CONDUCTANCE_OFFSET: i32 = 128;

/// Conductance representing weight zero; programmed into padded cells.
pub const NEUTRAL_CONDUCTANCE: u8 = 128;

/// Cycles the crossbar needs between driving the input ports and a valid
/// row read-back (the RTL's analog settle window).
pub const SETTLE_CYCLES: u64 = 10;

/// Flat cell index for `IMC_PROG_ADDR`, row-major within the tile.
#[must_use]
pub const fn cell_index(row: usize, col: usize) -> u8 {
    (row * TILE_DIM + col) as u8
}

/// Map a signed weight onto its unsigned conductance.
///
/// `[-128, 127]` maps onto `[0, 255]`; zero maps to [`NEUTRAL_CONDUCTANCE`].
#[must_use]
pub const fn conductance(weight: i8) -> u8 {
    (weight as i16 + CONDUCTANCE_OFFSET as i16) as u8
}

/// Recover the signed MAC result from a biased raw row read-back.
///
/// `sum_v` must be the sum of the padded 8-lane input vector actually
/// driven into the tile. At tile scale the raw value is bounded by
/// `8 · 255 · 255 < 2^20`, so the cast cannot wrap.
#[must_use]
pub const fn correct(raw: u32, sum_v: u32) -> i32 {
    raw as i32 - CONDUCTANCE_OFFSET * sum_v as i32
}

/// Pack the 8-lane input vector into the two 32-bit input ports.
///
/// Returns `(VIN_LO, VIN_HI)`: lanes 0–3 little-endian in the low word,
/// lanes 4–7 in the high word.
#[must_use]
pub const fn pack_input(v: [u8; TILE_DIM]) -> (u32, u32) {
    let lo = u32::from_le_bytes([v[0], v[1], v[2], v[3]]);
    let hi = u32::from_le_bytes([v[4], v[5], v[6], v[7]]);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conductance_maps_signed_range_onto_unsigned() {
        assert_eq!(conductance(-128), 0);
        assert_eq!(conductance(0), NEUTRAL_CONDUCTANCE);
        assert_eq!(conductance(127), 255);
    }

    #[test]
    fn offset_correction_roundtrip_exact() {
        // (w + 128)·x − 128·x == w·x for the full weight and input ranges.
        for w in i8::MIN..=i8::MAX {
            for x in [0u32, 1, 17, 128, 254, 255] {
                let raw = u32::from(conductance(w)) * x;
                assert_eq!(correct(raw, x), i32::from(w) * x as i32, "w={w} x={x}");
            }
        }
    }

    #[test]
    fn neutral_cell_corrects_to_zero() {
        // A padded cell contributes 128·x of bias and nothing else.
        let x = 201u32;
        let raw = u32::from(NEUTRAL_CONDUCTANCE) * x;
        assert_eq!(correct(raw, x), 0);
    }

    #[test]
    fn cell_index_is_row_major() {
        assert_eq!(cell_index(0, 0), 0);
        assert_eq!(cell_index(0, 7), 7);
        assert_eq!(cell_index(1, 0), 8);
        assert_eq!(cell_index(7, 7), 63);
    }

    #[test]
    fn input_packing_is_little_endian_per_word() {
        let (lo, hi) = pack_input([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(lo, 0x0403_0201);
        assert_eq!(hi, 0x0807_0605);
    }
}
