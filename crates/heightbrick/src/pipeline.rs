//! # Generation Pipeline
//!
//! Wires image loading, height transforms and every core stage together.
//!
//! ## Stage Order
//!
//! ```text
//! load palette -> load catalog -> load heightmap -> load colormap
//!   -> quantize -> resize_z -> clamp_step -> ground
//!   -> build grid -> gap fill -> optimize -> write
//! ```
//!
//! The palette and catalog are read before any image is touched. Height
//! transforms only run when configured. Nothing is written unless every
//! earlier stage succeeds.

use std::time::Instant;

use heightbrick_core::{
    build_grid, clamp_step, fill_gaps, ground, optimize, quantize_colors, resize_z, serialize,
    BrickCatalog, MergeStats, Palette, SaveSummary,
};
use tracing::info;

use crate::config::GenerationConfig;
use crate::error::AppResult;
use crate::image_io::{load_colormap, load_heightmap};

/// What a generation run produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Grid rows (heightmap pixel rows).
    pub rows: usize,
    /// Grid columns (heightmap pixel columns).
    pub cols: usize,
    /// Cells stacked by gap filling.
    pub stacked_cells: usize,
    /// 2x2 merge results; zero when optimization is off.
    pub merge: MergeStats,
    /// The written file.
    pub save: SaveSummary,
}

/// Runs a full generation as described by `config`.
///
/// # Errors
///
/// Returns the first error raised by validation, loading, or any stage.
/// The output file is untouched on error.
pub fn run(config: &GenerationConfig) -> AppResult<PipelineSummary> {
    let start = Instant::now();
    config.validate()?;
    let palette = Palette::load(&config.colorset)?;
    let catalog = BrickCatalog::load(&config.bricks)?;

    let heights = load_heightmap(&config.heightmap, config.width, config.height)?;
    let (rows, cols) = heights.shape();
    let pixels = load_colormap(&config.colormap, rows, cols)?;
    let colors = quantize_colors(&palette, &pixels)?;

    let mut heights = match config.z {
        Some(z) => resize_z(&heights, z),
        None => heights,
    };
    if config.step != 1 {
        heights = clamp_step(&heights, config.step)?;
    }
    if config.ground {
        heights = ground(&heights);
    }

    let mut cells = build_grid(&heights, &colors)?;

    let stacked_cells = if config.gap_fill {
        fill_gaps(&mut cells, catalog.base_height())?
    } else {
        0
    };
    let merge = if config.optimize {
        optimize(&mut cells)
    } else {
        MergeStats::default()
    };

    let save = serialize(&cells, &catalog, &palette, config.owner(), &config.output)?;

    info!(
        rows,
        cols,
        records = save.records,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "generation complete"
    );
    Ok(PipelineSummary {
        rows,
        cols,
        stacked_cells,
        merge,
        save,
    })
}
