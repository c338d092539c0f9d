//! # Color Quantization
//!
//! Maps every pixel of a color image to the nearest palette entry.
//!
//! ## Algorithm
//!
//! 1. Normalize the pixel to `[0, 1]`
//! 2. If that exact color was seen before, reuse its index
//! 3. Otherwise scan the palette in index order, keeping the first entry with
//!    the smallest Euclidean distance over RGBA
//!
//! Work is bounded by the number of *distinct* input colors times the palette
//! size, not by the pixel count.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::grid::Grid;
use crate::palette::{ColorKey, Palette, Rgba};

/// Nearest-color lookup with a per-color memo.
#[derive(Debug)]
pub struct ColorQuantizer<'p> {
    palette: &'p Palette,
    cache: HashMap<ColorKey, usize>,
}

impl<'p> ColorQuantizer<'p> {
    /// Creates a quantizer over `palette`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if the palette is empty.
    pub fn new(palette: &'p Palette) -> CoreResult<Self> {
        if palette.is_empty() {
            return Err(CoreError::InvalidParameter(
                "cannot quantize against an empty palette".to_string(),
            ));
        }
        Ok(Self {
            palette,
            cache: HashMap::new(),
        })
    }

    /// Returns the palette index closest to `color`.
    pub fn nearest(&mut self, color: Rgba) -> usize {
        let palette = self.palette;
        *self
            .cache
            .entry(color.key())
            .or_insert_with(|| nearest_index(palette, color))
    }

    /// Number of distinct colors resolved so far.
    #[inline]
    #[must_use]
    pub fn distinct_colors(&self) -> usize {
        self.cache.len()
    }
}

/// Linear scan; strict `<` keeps the earliest index on ties.
fn nearest_index(palette: &Palette, color: Rgba) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, &candidate) in palette.colors().iter().enumerate() {
        let distance = color.distance(candidate);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Quantizes an 8-bit RGBA grid to palette indices of the same shape.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameter` if the palette is empty.
pub fn quantize_colors(palette: &Palette, colors: &Grid<[u8; 4]>) -> CoreResult<Grid<usize>> {
    let start = Instant::now();
    let mut quantizer = ColorQuantizer::new(palette)?;

    let indices = colors.map(|&px| quantizer.nearest(Rgba::from_rgba8(px)));

    if quantizer.distinct_colors() > palette.len() {
        warn!(
            distinct = quantizer.distinct_colors(),
            palette = palette.len(),
            "color image has more colors than the palette; output will be approximated"
        );
    }
    info!(
        pixels = colors.len(),
        distinct = quantizer.distinct_colors(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "quantized colors"
    );

    Ok(indices)
}
