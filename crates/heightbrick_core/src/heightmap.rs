//! # Height Transforms
//!
//! Optional reshaping of the raw height grid before cells are built.
//! The pipeline applies them in this order: [`resize_z`], [`clamp_step`],
//! [`ground`].

use crate::error::{CoreError, CoreResult};
use crate::grid::Grid;

fn min_max(heights: &Grid<u32>) -> Option<(u32, u32)> {
    let slice = heights.as_slice();
    Some((*slice.iter().min()?, *slice.iter().max()?))
}

/// Stretches heights so they span `[min, min + z]`, truncating to whole plates.
///
/// Heights saturate at `u32::MAX` when `min + z` does not fit.
/// Flat grids are returned unchanged.
#[must_use]
pub fn resize_z(heights: &Grid<u32>, z: u32) -> Grid<u32> {
    let Some((min, max)) = min_max(heights) else {
        return heights.clone();
    };
    if max == min {
        return heights.clone();
    }

    let range = f64::from(max - min);
    let z = f64::from(z);
    heights.map(|&h| {
        let stretched = f64::from(h - min) / range * z;
        // Truncation is intended: floor of a non-negative value
        min.saturating_add(stretched as u32)
    })
}

/// Snaps every height to the nearest multiple of `step`, ties to even.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameter` if `step` is zero.
pub fn clamp_step(heights: &Grid<u32>, step: u32) -> CoreResult<Grid<u32>> {
    if step == 0 {
        return Err(CoreError::InvalidParameter(
            "height step must be at least 1".to_string(),
        ));
    }
    Ok(heights.map(|&h| {
        let q = h / step;
        let r = h % step;
        let twice = u64::from(r) * 2;
        let up = match twice.cmp(&u64::from(step)) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => q % 2 == 1,
            std::cmp::Ordering::Less => false,
        };
        let snapped = if up { q + 1 } else { q };
        snapped.saturating_mul(step)
    }))
}

/// Lowers the grid so its lowest cell sits at height 0.
#[must_use]
pub fn ground(heights: &Grid<u32>) -> Grid<u32> {
    let min = heights.as_slice().iter().copied().min().unwrap_or(0);
    heights.map(|&h| h - min)
}
