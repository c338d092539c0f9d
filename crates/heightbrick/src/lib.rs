//! # HEIGHTBRICK
//!
//! Front end for `heightbrick_core`: decodes the heightmap and colormap,
//! resolves settings, and drives the conversion to a `.bls` save file.
//!
//! ```rust,ignore
//! use heightbrick::{run, GenerationConfig};
//!
//! let config = GenerationConfig {
//!     heightmap: "maps/island.png".into(),
//!     gap_fill: true,
//!     optimize: true,
//!     ..GenerationConfig::default()
//! };
//! let summary = run(&config)?;
//! println!("{} bricks", summary.save.records);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod image_io;
pub mod pipeline;

pub use config::GenerationConfig;
pub use error::{AppError, AppResult};
pub use image_io::{load_colormap, load_heightmap};
pub use pipeline::{run, PipelineSummary};
