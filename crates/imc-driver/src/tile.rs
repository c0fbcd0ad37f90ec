//! Tile MAC unit — one fixed-size crossbar operation.
//!
//! Multiplies one 8×8 sub-block of a signed weight matrix by an 8-lane
//! slice of an unsigned input vector, entirely through the crossbar's
//! unsigned-conductance representation, and recovers the exact signed
//! partial sums via offset correction.
//!
//! Out-of-range tile cells degrade gracefully: positions beyond the true
//! matrix bounds are programmed with the neutral conductance and padded
//! input lanes carry zero, so they contribute exactly nothing to any row.

use crate::backend::CrossbarBackend;
use imc_chip::tile::{
    cell_index, conductance, correct, NEUTRAL_CONDUCTANCE, TILE_DIM,
};

/// Drives one crossbar tile operation through a backend.
///
/// Borrows the backend exclusively for the duration of the operation —
/// the physical model has a single programmable tile.
#[derive(Debug)]
pub struct TileMacUnit<'a, B: CrossbarBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: CrossbarBackend + ?Sized> TileMacUnit<'a, B> {
    /// Attach to a backend.
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Compute the corrected signed partial sums for one tile.
    ///
    /// `weights` is the full `rows × cols` row-major matrix;
    /// `(row_start, col_start)` selects the tile's top-left corner. The
    /// returned array holds one corrected MAC per tile row; rows beyond
    /// the true matrix correct to exactly zero.
    pub fn compute_tile(
        &mut self,
        weights: &[i8],
        rows: usize,
        cols: usize,
        input: &[u8],
        row_start: usize,
        col_start: usize,
    ) -> [i32; TILE_DIM] {
        debug_assert_eq!(weights.len(), rows * cols);
        debug_assert_eq!(input.len(), cols);

        // Program: in-bounds cells get the offset weight, the rest neutral.
        for r in 0..TILE_DIM {
            let w_row = row_start + r;
            for c in 0..TILE_DIM {
                let w_col = col_start + c;
                let g = if w_row < rows && w_col < cols {
                    conductance(weights[w_row * cols + w_col])
                } else {
                    NEUTRAL_CONDUCTANCE
                };
                self.backend.program_cell(cell_index(r, c), g);
            }
        }

        // Drive: zero-fill lanes beyond the true column count. The bias
        // subtracted later uses this padded lane sum, not the column count.
        let mut v = [0u8; TILE_DIM];
        let mut sum_v: u32 = 0;
        for (c, lane) in v.iter_mut().enumerate() {
            if col_start + c < cols {
                *lane = input[col_start + c];
                sum_v += u32::from(*lane);
            }
        }
        self.backend.set_input(v);
        self.backend.wait_settle();

        // Read and correct. An uncorrected raw read is meaningless outside
        // this unit.
        let mut out = [0i32; TILE_DIM];
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = correct(self.backend.read_row(r), sum_v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SimBackend;

    fn reference_mac(weights: &[i8], cols: usize, input: &[u8], row: usize) -> i32 {
        (0..cols)
            .map(|c| i32::from(weights[row * cols + c]) * i32::from(input[c]))
            .sum()
    }

    #[test]
    fn full_tile_matches_reference() {
        let rows = 8;
        let cols = 8;
        let weights: Vec<i8> = (0..rows * cols).map(|i| (i as i8).wrapping_mul(7)).collect();
        let input: Vec<u8> = (0..cols).map(|c| (c * 31 + 5) as u8).collect();

        let mut backend = SimBackend::new().with_settle_cycles(0);
        let out = TileMacUnit::new(&mut backend).compute_tile(&weights, rows, cols, &input, 0, 0);
        for r in 0..rows {
            assert_eq!(out[r], reference_mac(&weights, cols, &input, r), "row {r}");
        }
    }

    #[test]
    fn padded_cells_contribute_nothing() {
        // 3×5 matrix in an 8×8 tile: rows 3–7 and cols 5–7 are padding.
        let rows = 3;
        let cols = 5;
        let weights: Vec<i8> = vec![-100, -1, 0, 1, 100, 50, -50, 25, -25, 5, 7, -7, 3, -3, 127];
        let input: Vec<u8> = vec![255, 1, 0, 200, 13];

        let mut backend = SimBackend::new().with_settle_cycles(0);
        let out = TileMacUnit::new(&mut backend).compute_tile(&weights, rows, cols, &input, 0, 0);
        for r in 0..rows {
            assert_eq!(out[r], reference_mac(&weights, cols, &input, r), "row {r}");
        }
        // Rows beyond the true matrix correct to exactly zero.
        for r in rows..TILE_DIM {
            assert_eq!(out[r], 0, "padded row {r}");
        }
    }

    #[test]
    fn offset_tile_reads_the_right_block() {
        // 16×16 matrix, tile at (8, 8).
        let rows = 16;
        let cols = 16;
        let weights: Vec<i8> = (0..rows * cols).map(|i| ((i % 251) as i16 - 125) as i8).collect();
        let input: Vec<u8> = (0..cols).map(|c| (c * 13 + 1) as u8).collect();

        let mut backend = SimBackend::new().with_settle_cycles(0);
        let out = TileMacUnit::new(&mut backend).compute_tile(&weights, rows, cols, &input, 8, 8);
        for r in 0..TILE_DIM {
            let expected: i32 = (8..16)
                .map(|c| i32::from(weights[(8 + r) * cols + c]) * i32::from(input[c]))
                .sum();
            assert_eq!(out[r], expected, "row {r}");
        }
    }

    #[test]
    fn settle_sits_between_drive_and_read() {
        let weights = vec![1i8];
        let input = vec![1u8];
        let mut backend = SimBackend::new();
        let out = TileMacUnit::new(&mut backend).compute_tile(&weights, 1, 1, &input, 0, 0);
        assert_eq!(out[0], 1);
        assert!(backend.is_settled());
    }
}
