//! # Gap Filling
//!
//! A single brick per cell leaves holes wherever a cell towers over a
//! neighbor. Each cell is stacked downward far enough to cover the largest
//! drop to any of its four axis-aligned neighbors.
//!
//! Only `stack_count` is written; heights are read-only, so each cell's
//! result is independent of the others and of visiting order.

use std::time::Instant;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::grid::{Cell, Grid};

/// Raises `stack_count` so every cell covers its steepest drop.
///
/// For each neighbor lower by `gap > base_height`, the cell needs
/// `ceil(gap / base_height)` bricks; the largest such count wins. Cells with
/// no qualifying gap keep their current count.
///
/// Returns the number of cells that were stacked.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameter` if `base_height` is zero.
pub fn fill_gaps(cells: &mut Grid<Cell>, base_height: u32) -> CoreResult<usize> {
    if base_height == 0 {
        return Err(CoreError::InvalidParameter(
            "base brick height must be at least one plate".to_string(),
        ));
    }

    let start = Instant::now();
    let (rows, cols) = cells.shape();
    let mut stacked = 0;

    for i in 0..rows {
        for j in 0..cols {
            let height = cells[(i, j)].height;
            let mut largest = 0;

            let neighbors = [
                i.checked_sub(1).map(|up| (up, j)),
                (i + 1 < rows).then_some((i + 1, j)),
                j.checked_sub(1).map(|left| (i, left)),
                (j + 1 < cols).then_some((i, j + 1)),
            ];

            for (ni, nj) in neighbors.into_iter().flatten() {
                let gap = height.saturating_sub(cells[(ni, nj)].height);
                if gap > base_height {
                    largest = largest.max(gap.div_ceil(base_height));
                }
            }

            if largest > 0 {
                cells[(i, j)].stack_count = largest;
                stacked += 1;
            }
        }
    }

    info!(
        stacked,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "filled vertical gaps"
    );
    Ok(stacked)
}
