//! Layer executor — tiled matrix-vector multiply over the crossbar.
//!
//! Decomposes an arbitrary `rows × cols` weight matrix into 8×8 tiles and
//! accumulates each tile's corrected partial sums into per-output-row
//! accumulators. Tiles are independent and additive, so the iteration
//! order has no effect on the result; the column-band-outer order is kept
//! from the original firmware for cycle-count parity.

use crate::backend::CrossbarBackend;
use crate::tile::TileMacUnit;
use imc_chip::tile::TILE_DIM;

/// Multiply a signed weight matrix by an unsigned input vector, one
/// crossbar tile at a time.
///
/// `rows` and `cols` need not be multiples of 8; the tile unit's padding
/// absorbs the remainder, so there is no edge-case branching here. The
/// returned accumulator holds the exact signed products — element-wise
/// equal to a direct dot product.
pub fn run_layer<B: CrossbarBackend + ?Sized>(
    backend: &mut B,
    weights: &[i8],
    input: &[u8],
    rows: usize,
    cols: usize,
) -> Vec<i32> {
    debug_assert_eq!(weights.len(), rows * cols);
    debug_assert_eq!(input.len(), cols);

    let mut acc = vec![0i32; rows];
    let mut col_start = 0;
    while col_start < cols {
        let mut row_start = 0;
        while row_start < rows {
            let partial = TileMacUnit::new(backend)
                .compute_tile(weights, rows, cols, input, row_start, col_start);
            for (r, &p) in partial.iter().enumerate() {
                let w_row = row_start + r;
                if w_row < rows {
                    acc[w_row] += p;
                }
            }
            row_start += TILE_DIM;
        }
        col_start += TILE_DIM;
    }
    acc
}
