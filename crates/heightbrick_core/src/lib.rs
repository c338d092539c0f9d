//! # HEIGHTBRICK Core
//!
//! Converts a height grid and a color grid into a Blockland `.bls` save file.
//!
//! ## Pipeline
//!
//! ```text
//! Palette -> quantize_colors -> build_grid -> fill_gaps -> optimize -> serialize
//! ```
//!
//! 1. **Quantize**: every pixel is mapped to its nearest palette color
//! 2. **Build**: heights and color indices are fused into cells
//! 3. **Gap fill** (optional): cells are stacked to hide cliffs
//! 4. **Optimize** (optional): uniform 2x2 blocks become one large brick
//! 5. **Serialize**: cells are expanded to brick records and written once
//!
//! The whole pipeline is single-threaded and deterministic: the same inputs
//! always produce the same file, byte for byte.
//!
//! ## Example
//!
//! ```rust,ignore
//! use heightbrick_core::{build_grid, fill_gaps, optimize, quantize_colors, serialize};
//! use heightbrick_core::{BrickCatalog, Palette};
//!
//! let palette = Palette::load("res/default/colorSet.txt")?;
//! let catalog = BrickCatalog::load("res/default/defaultBricks.json")?;
//!
//! let colors = quantize_colors(&palette, &color_grid)?;
//! let mut cells = build_grid(&height_grid, &colors)?;
//! fill_gaps(&mut cells, catalog.base_height())?;
//! optimize(&mut cells);
//! serialize(&cells, &catalog, &palette, Some(999_999), "out/map.bls")?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod brick;
pub mod catalog;
pub mod error;
pub mod gap_fill;
pub mod grid;
pub mod heightmap;
pub mod merge;
pub mod palette;
pub mod quantize;
pub mod save;

pub use brick::{BrickData, BrickPosition, BrickRecord, BrickShape, EventData};
pub use catalog::{BrickCatalog, CatalogEntry};
pub use error::{CoreError, CoreResult};
pub use gap_fill::fill_gaps;
pub use grid::{build_grid, BrickKind, Cell, Grid};
pub use heightmap::{clamp_step, ground, resize_z};
pub use merge::{optimize, MergeStats};
pub use palette::{Palette, Rgba, PALETTE_SLOTS};
pub use quantize::{quantize_colors, ColorQuantizer};
pub use save::{atomic_write, build_records, serialize, SaveFile, SaveSummary};
