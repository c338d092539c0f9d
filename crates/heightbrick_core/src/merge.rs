//! # Brick Merging
//!
//! Greedily replaces 2x2 blocks of identical cells with one large brick.
//!
//! ## Scan Order
//!
//! Anchors are visited row-major, top-left first: rows `0..H-1`, columns
//! `0..W-1`. The last row and column are never anchors. An anchor is skipped
//! when its own group or its right neighbor's group has already been
//! consumed by an earlier anchor; this keeps blocks from clipping each other
//! across a diagonal seam, and deliberately leaves some mergeable blocks
//! unmerged.
//!
//! Consumption is recorded as the scan runs, so a different scan order
//! produces a different (equally valid) selection. The order here is fixed
//! so that the same map always yields the same save file.

use std::time::Instant;

use tracing::info;

use crate::grid::{BrickKind, Cell, Grid};

/// Outcome of a merge pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Anchors examined (not skipped).
    pub anchors_examined: usize,
    /// 2x2 blocks merged into a large brick.
    pub blocks_merged: usize,
}

impl MergeStats {
    /// Cells absorbed into another cell's group.
    #[inline]
    #[must_use]
    pub const fn cells_absorbed(&self) -> usize {
        self.blocks_merged * 3
    }
}

/// Merges uniform 2x2 blocks in place.
///
/// A block merges when all four cells share height and color index. All
/// four then take the anchor's `group_id`, the largest of their four
/// `stack_count`s, and [`BrickKind::Large`].
///
/// Anchors whose group id falls outside the grid are skipped.
pub fn optimize(cells: &mut Grid<Cell>) -> MergeStats {
    let start = Instant::now();
    let (rows, cols) = cells.shape();
    let mut stats = MergeStats::default();

    // Group ids start as row-major cell ids, so they index a dense array
    let mut consumed = vec![false; cells.len()];

    for i in 0..rows.saturating_sub(1) {
        for j in 0..cols.saturating_sub(1) {
            let anchor_group = cells[(i, j)].group_id;
            let right_group = cells[(i, j + 1)].group_id;
            // Out-of-range ids are left for the serializer to reject
            if consumed.get(anchor_group) != Some(&false)
                || consumed.get(right_group) != Some(&false)
            {
                continue;
            }
            consumed[anchor_group] = true;
            stats.anchors_examined += 1;

            let block = [(i, j), (i + 1, j), (i, j + 1), (i + 1, j + 1)];
            let first = cells[(i, j)];
            let uniform = block.iter().all(|&pos| {
                let cell = &cells[pos];
                cell.height == first.height && cell.color_index == first.color_index
            });
            if !uniform {
                continue;
            }

            let stack = block
                .iter()
                .map(|&pos| cells[pos].stack_count)
                .max()
                .unwrap_or(first.stack_count);

            for pos in block {
                let cell = &mut cells[pos];
                cell.group_id = anchor_group;
                cell.stack_count = stack;
                cell.kind = BrickKind::Large;
            }
            stats.blocks_merged += 1;
        }
    }

    info!(
        merged = stats.blocks_merged,
        absorbed = stats.cells_absorbed(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "merged 2x2 blocks"
    );
    stats
}
