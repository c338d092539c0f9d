//! # Cell Grid
//!
//! Height and color data are fused into a dense, row-major grid of [`Cell`]s.
//!
//! ## Cell Lifecycle
//!
//! 1. Created once by [`build_grid`], each cell its own group
//! 2. `stack_count` raised by the gap filler
//! 3. `group_id`, `stack_count` and `kind` rewritten by the merger
//! 4. Read by the serializer, never mutated again
//!
//! Row index `i` runs along the save file's X axis, column index `j` along Y.

use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// A dense 2-D grid stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Wraps row-major `data` as a `rows` x `cols` grid.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> CoreResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(CoreError::InvalidParameter(format!(
                "grid of {rows}x{cols} cannot hold {} values",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> CoreResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut data = Vec::with_capacity(height * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(CoreError::InvalidParameter(format!(
                    "row {i} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { rows: height, cols, data })
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as (rows, cols).
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the grid has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major index of `(row, col)`.
    #[inline]
    #[must_use]
    pub const fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Returns the value at `(row, col)`, if in bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(self.flat_index(row, col))
        } else {
            None
        }
    }

    /// Returns the value at `(row, col)` mutably, if in bounds.
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            let idx = self.flat_index(row, col);
            self.data.get_mut(idx)
        } else {
            None
        }
    }

    /// Row-major view of all values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major view of all values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics; an empty grid has no rows to yield anyway
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Applies `f` to every value, keeping the shape.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "grid index ({row}, {col}) out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "grid index ({row}, {col}) out of bounds");
        &mut self.data[row * self.cols + col]
    }
}

/// Which catalog brick a cell is emitted as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrickKind {
    /// The 1x1 footprint brick (catalog entry 0).
    #[default]
    Small,
    /// The merged 2x2 footprint brick (catalog entry 1).
    Large,
}

impl BrickKind {
    /// Position of this brick in the catalog's `bricks` array.
    #[inline]
    #[must_use]
    pub const fn catalog_index(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Large => 1,
        }
    }
}

/// One grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Top height in plate units.
    pub height: u32,
    /// Index into the palette.
    pub color_index: usize,
    /// Group this cell is emitted with; the representative cell's original id.
    pub group_id: usize,
    /// Number of bricks stacked downward from `height` (at least 1).
    pub stack_count: u32,
    /// Brick variant to emit.
    pub kind: BrickKind,
}

impl Cell {
    /// Creates a fresh cell that is its own group.
    #[inline]
    #[must_use]
    pub const fn new(height: u32, color_index: usize, group_id: usize) -> Self {
        Self {
            height,
            color_index,
            group_id,
            stack_count: 1,
            kind: BrickKind::Small,
        }
    }
}

/// Fuses a height grid and a quantized color grid into cells.
///
/// Group ids are assigned 0, 1, 2, ... in row-major order.
///
/// # Errors
///
/// Returns `CoreError::ShapeMismatch` if the two grids differ in shape.
pub fn build_grid(heights: &Grid<u32>, colors: &Grid<usize>) -> CoreResult<Grid<Cell>> {
    if heights.shape() != colors.shape() {
        return Err(CoreError::ShapeMismatch {
            height: heights.shape(),
            color: colors.shape(),
        });
    }

    let data = heights
        .as_slice()
        .iter()
        .zip(colors.as_slice())
        .enumerate()
        .map(|(id, (&height, &color))| Cell::new(height, color, id))
        .collect();

    debug!(rows = heights.rows(), cols = heights.cols(), "built cell grid");

    Ok(Grid {
        rows: heights.rows(),
        cols: heights.cols(),
        data,
    })
}
