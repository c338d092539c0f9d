//! # Save File Serialization
//!
//! Turns a finished cell grid into a `.bls` save file.
//!
//! ## Format
//!
//! ```text
//! This is a Blockland save file.  You probably shouldn't modify it cause you'll screw it up.
//! 1
//! <description>
//! <64 palette lines>
//! Linecount <N>
//! <N brick records>
//! ```
//!
//! ## Durability
//!
//! The whole file is built in memory first. It is then written to
//! `{path}.tmp`, synced, and renamed over `path`, so a failure at any point
//! leaves the previous file (if any) untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::brick::{BrickData, BrickPosition, BrickRecord};
use crate::catalog::BrickCatalog;
use crate::error::{require_non_blank, CoreError, CoreResult};
use crate::grid::{BrickKind, Cell, Grid};
use crate::palette::Palette;

/// First header line; the game checks for it verbatim.
pub const HEADER_WARNING: &str =
    "This is a Blockland save file.  You probably shouldn't modify it cause you'll screw it up.";

/// Description block: line count, then the description itself.
pub const HEADER_DESCRIPTION: &str = "1\nMap Generated with heightbrick";

/// Prefix of the record count line.
pub const LINECOUNT_PREFIX: &str = "Linecount ";

/// What a successful write produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Brick records written (the `Linecount` value).
    pub records: usize,
    /// Distinct groups emitted.
    pub groups: usize,
    /// Size of the file in bytes.
    pub bytes: usize,
}

/// Expands every group into its stacked brick records, in row-major order.
///
/// Each group is emitted once, at its first cell in scan order. A group
/// with `stack_count` n yields n records, lowest first, spaced by the small
/// brick's height. Every record gets a `+-OWNER` line when `owner` is set.
///
/// # Errors
///
/// Returns `CoreError::Format` if the catalog lacks an entry a cell needs.
pub fn build_records(
    cells: &Grid<Cell>,
    catalog: &BrickCatalog,
    owner: Option<u32>,
) -> CoreResult<Vec<BrickRecord>> {
    let small = catalog.entry(BrickKind::Small)?;
    let base_height = i64::from(small.shape.z);
    // Only demand a large entry when merging actually produced one
    let large = if cells.as_slice().iter().any(|c| c.kind == BrickKind::Large) {
        Some(catalog.entry(BrickKind::Large)?)
    } else {
        None
    };

    let mut emitted = vec![false; cells.len()];
    let mut records = Vec::with_capacity(cells.len());

    for i in 0..cells.rows() {
        for j in 0..cells.cols() {
            let cell = cells[(i, j)];
            let Some(seen) = emitted.get_mut(cell.group_id) else {
                return Err(CoreError::InvalidParameter(format!(
                    "cell ({i}, {j}) has group id {} outside the grid",
                    cell.group_id
                )));
            };
            if *seen {
                continue;
            }
            *seen = true;

            for remaining in (1..=i64::from(cell.stack_count.max(1))).rev() {
                let top = i64::from(cell.height) - (remaining - 1) * base_height;
                let (name, position) = match (cell.kind, large) {
                    (BrickKind::Large, Some(entry)) => (
                        &entry.ui_name,
                        BrickPosition::large(entry.shape, i, j, top, entry.offset.unwrap_or_default()),
                    ),
                    _ => (&small.ui_name, BrickPosition::small(small.shape, i, j, top)),
                };

                let mut record = BrickRecord::new(name.as_str(), position, cell.color_index);
                if let Some(bl_id) = owner {
                    record = record.with_data(BrickData::Owner { bl_id });
                }
                records.push(record);
            }
        }
    }

    debug!(records = records.len(), "built brick records");
    Ok(records)
}

/// A fully assembled save file.
#[derive(Clone, Debug)]
pub struct SaveFile {
    palette_block: String,
    records: Vec<BrickRecord>,
}

impl SaveFile {
    /// Assembles a save from a palette and brick records.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Format` if the palette exceeds 64 colors.
    pub fn new(palette: &Palette, records: Vec<BrickRecord>) -> CoreResult<Self> {
        Ok(Self {
            palette_block: palette.serialize()?,
            records,
        })
    }

    /// Brick records in file order.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[BrickRecord] {
        &self.records
    }

    /// Renders the complete file text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut body = String::new();
        for record in &self.records {
            body.push_str(&record.to_string());
        }

        let count_line = format!("{LINECOUNT_PREFIX}{}\n", self.records.len());
        let mut out = String::with_capacity(
            HEADER_WARNING.len()
                + HEADER_DESCRIPTION.len()
                + self.palette_block.len()
                + count_line.len()
                + body.len()
                + 2,
        );
        out.push_str(HEADER_WARNING);
        out.push('\n');
        out.push_str(HEADER_DESCRIPTION);
        out.push('\n');
        out.push_str(&self.palette_block);
        out.push_str(&count_line);
        out.push_str(&body);
        out
    }

    /// Renders and atomically writes the file to `path`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` for a blank path, or
    /// `CoreError::Io` if writing fails.
    pub fn write(&self, path: impl AsRef<Path>) -> CoreResult<usize> {
        let text = self.render();
        atomic_write(path.as_ref(), text.as_bytes())?;
        Ok(text.len())
    }
}

/// Converts `cells` and writes the save file to `destination`.
///
/// # Errors
///
/// - `CoreError::InvalidParameter` if `destination` is blank
/// - `CoreError::Format` if the palette or catalog cannot encode the grid
/// - `CoreError::Io` if the file cannot be written
pub fn serialize(
    cells: &Grid<Cell>,
    catalog: &BrickCatalog,
    palette: &Palette,
    owner: Option<u32>,
    destination: impl AsRef<Path>,
) -> CoreResult<SaveSummary> {
    let start = Instant::now();
    let destination = destination.as_ref();
    require_non_blank("output path", &destination.display().to_string())?;

    let records = build_records(cells, catalog, owner)?;
    let save = SaveFile::new(palette, records)?;
    let groups = count_groups(cells);
    let bytes = save.write(destination)?;

    let summary = SaveSummary {
        records: save.records().len(),
        groups,
        bytes,
    };
    info!(
        path = %destination.display(),
        records = summary.records,
        groups = summary.groups,
        bytes = summary.bytes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote save file"
    );
    Ok(summary)
}

fn count_groups(cells: &Grid<Cell>) -> usize {
    let mut seen = vec![false; cells.len()];
    let mut groups = 0;
    for cell in cells.as_slice() {
        if let Some(slot) = seen.get_mut(cell.group_id) {
            if !*slot {
                *slot = true;
                groups += 1;
            }
        }
    }
    groups
}

/// Writes `data` to `{path}.tmp`, syncs it, then renames it over `path`.
///
/// The parent directory is created if missing. On failure the temp file is
/// removed and `path` is left as it was.
///
/// # Errors
///
/// Returns `CoreError::Io` if any step fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> CoreResult<()> {
    let name = path.display().to_string();
    require_non_blank("output path", &name)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let io_err = |e: std::io::Error| CoreError::Io {
        path: name.clone(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    if let Err(e) = write_then_rename(&tmp_path, path, data) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }
    Ok(())
}

fn write_then_rename(tmp_path: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp_path, path)
}
