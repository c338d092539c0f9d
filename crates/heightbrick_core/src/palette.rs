//! # Palette (Colorset)
//!
//! The fixed set of colors the game can reference by index.
//!
//! ## Source Format
//!
//! ```text
//! DIV:Grays                  <- divider, ignored
//! 0.9 0.9 0.9 1              <- one RGBA color per line
//! 128 128 128 255            <- any channel > 1 means the line is 0-255
//!                            <- blank line closes a column
//! DIV:Reds
//! 1 0 0 1
//! ```
//!
//! Columns only shape the source file. Indices run across all columns in
//! order of appearance.
//!
//! ## Save Block
//!
//! A save file always carries exactly [`PALETTE_SLOTS`] color lines; unused
//! slots are filled with [`PLACEHOLDER_LINE`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::error::{require_non_blank, CoreError, CoreResult};

/// Number of color slots in a save file.
pub const PALETTE_SLOTS: usize = 64;

/// Line written for every unused palette slot.
pub const PLACEHOLDER_LINE: &str = "1.000000 0.000000 1.000000 0.000000\n";

/// Segment marking a divider line in a palette source.
pub const DIVIDER_TOKEN: &str = "DIV";

/// An RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Rgba {
    /// Creates a color from normalized channels.
    #[inline]
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Normalizes an 8-bit RGBA pixel.
    ///
    /// Channels are divided in single precision before widening, so the same
    /// pixel always yields the same bits.
    #[inline]
    #[must_use]
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        let n = |c: u8| f64::from(f32::from(c) / 255.0);
        Self::new(n(px[0]), n(px[1]), n(px[2]), n(px[3]))
    }

    /// Bit-exact hash key.
    #[inline]
    #[must_use]
    pub fn key(self) -> ColorKey {
        ColorKey([
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ])
    }

    /// Euclidean distance across all four channels.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        let da = self.a - other.a;
        (dr * dr + dg * dg + db * db + da * da).sqrt()
    }
}

/// Exact bit pattern of an [`Rgba`], usable as a hash map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorKey([u64; 4]);

/// An ordered palette with O(1) reverse lookup.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    /// Colors grouped as they appeared in the source.
    columns: Vec<Vec<Rgba>>,
    /// All colors in index order.
    colors: Vec<Rgba>,
    /// Exact color -> first index it appeared at.
    reverse: HashMap<ColorKey, usize>,
    /// Where the colors came from; named in errors.
    source_name: String,
}

impl Palette {
    /// Identifier of the source this palette was read from.
    #[inline]
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Builds a single-column palette from colors in index order.
    #[must_use]
    pub fn from_colors(colors: Vec<Rgba>) -> Self {
        let mut palette = Self {
            source_name: "palette".to_string(),
            ..Self::default()
        };
        palette.push_column(colors);
        palette
    }

    /// Reads and parses a palette file.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidParameter` if `path` is blank
    /// - `CoreError::NotFound` if the file does not exist
    /// - `CoreError::Format` if a line is malformed
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        require_non_blank("palette path", &name)?;

        let text = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(&name, &e))?;
        let palette = Self::parse(&name, &text)?;
        debug!(path = %name, colors = palette.len(), columns = palette.columns.len(), "loaded palette");
        Ok(palette)
    }

    /// Parses palette source text. `source_name` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Format` if a non-blank, non-divider line is not
    /// exactly four numbers.
    pub fn parse(source_name: &str, text: &str) -> CoreResult<Self> {
        let mut palette = Self {
            source_name: source_name.to_string(),
            ..Self::default()
        };
        let mut column = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                palette.push_column(std::mem::take(&mut column));
                continue;
            }
            if is_divider(line) {
                continue;
            }
            column.push(parse_color(source_name, idx + 1, line)?);
        }

        // Source may not end with a blank line
        if !column.is_empty() {
            palette.push_column(column);
        }

        Ok(palette)
    }

    fn push_column(&mut self, column: Vec<Rgba>) {
        if column.is_empty() {
            return;
        }
        for &color in &column {
            let index = self.colors.len();
            self.reverse.entry(color.key()).or_insert(index);
            self.colors.push(color);
        }
        self.columns.push(column);
    }

    /// All colors in index order.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Colors grouped by source column.
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[Vec<Rgba>] {
        &self.columns
    }

    /// Number of active colors.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the palette has no colors.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns the color at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rgba> {
        self.colors.get(index).copied()
    }

    /// Index of an exact color, if it is in the palette.
    #[inline]
    #[must_use]
    pub fn index_of(&self, color: Rgba) -> Option<usize> {
        self.reverse.get(&color.key()).copied()
    }

    /// Renders the save file's palette block: one line per color, padded
    /// with placeholders to exactly [`PALETTE_SLOTS`] lines.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Format` if there are more than [`PALETTE_SLOTS`] colors.
    pub fn serialize(&self) -> CoreResult<String> {
        if self.colors.len() > PALETTE_SLOTS {
            return Err(CoreError::format(
                &self.source_name,
                format!(
                    "{} colors do not fit in {PALETTE_SLOTS} save slots",
                    self.colors.len()
                ),
            ));
        }

        let mut out = String::with_capacity(PALETTE_SLOTS * PLACEHOLDER_LINE.len());
        for c in &self.colors {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{:.6} {:.6} {:.6} {:.6}", c.r, c.g, c.b, c.a);
        }
        for _ in self.colors.len()..PALETTE_SLOTS {
            out.push_str(PLACEHOLDER_LINE);
        }
        Ok(out)
    }
}

fn is_divider(line: &str) -> bool {
    line.split(':').any(|segment| segment.trim() == DIVIDER_TOKEN)
}

fn parse_color(source_name: &str, line_no: usize, line: &str) -> CoreResult<Rgba> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(CoreError::format_at(
            source_name,
            line_no,
            format!("expected 4 channels, found {}", tokens.len()),
        ));
    }

    let mut channels = [0.0f64; 4];
    for (slot, token) in channels.iter_mut().zip(&tokens) {
        *slot = token.parse::<f64>().map_err(|_| {
            CoreError::format_at(source_name, line_no, format!("`{token}` is not a number"))
        })?;
    }

    if channels.iter().any(|&c| c > 1.0) {
        for c in &mut channels {
            *c /= 255.0;
        }
    }

    Ok(Rgba::new(channels[0], channels[1], channels[2], channels[3]))
}
