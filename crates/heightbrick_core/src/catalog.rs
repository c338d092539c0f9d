//! # Brick Catalog
//!
//! Describes which bricks the generator places. Only the first two entries
//! are used: entry 0 is the small brick, entry 1 the merged 2x2 brick.
//!
//! ```json
//! {
//!   "bricks": [
//!     { "shape": [1, 1, 1], "ui_name": "1x1f" },
//!     { "shape": [2, 2, 1], "ui_name": "2x2f", "offset": [0.25, 0.25] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::brick::BrickShape;
use crate::error::{require_non_blank, CoreError, CoreResult};
use crate::grid::BrickKind;

/// One brick the catalog offers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CatalogEntry {
    /// Size in studs (x, y) and plates (z).
    pub shape: BrickShape,
    /// Name the game knows the brick by.
    pub ui_name: String,
    /// Save-space offset added to the position of merged bricks.
    #[serde(default)]
    pub offset: Option<[f64; 2]>,
}

/// The parsed brick catalog document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BrickCatalog {
    /// Available bricks; index 0 small, index 1 large.
    pub bricks: Vec<CatalogEntry>,
}

impl BrickCatalog {
    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidParameter` if `path` is blank
    /// - `CoreError::NotFound` if the file does not exist
    /// - `CoreError::Format` if the document is malformed
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        require_non_blank("brick catalog path", &name)?;

        let text = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(&name, &e))?;
        let catalog = Self::from_json_str(&name, &text)?;
        debug!(path = %name, bricks = catalog.bricks.len(), "loaded brick catalog");
        Ok(catalog)
    }

    /// Parses catalog JSON. `source_name` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Format` if the JSON is invalid, the `bricks` array
    /// is empty, or the small brick has a zero dimension.
    pub fn from_json_str(source_name: &str, text: &str) -> CoreResult<Self> {
        let catalog: Self = serde_json::from_str(text).map_err(|e| CoreError::Format {
            source_name: source_name.to_string(),
            line: Some(e.line()),
            reason: e.to_string(),
        })?;

        let small = catalog
            .bricks
            .first()
            .ok_or_else(|| CoreError::format(source_name, "`bricks` array is empty"))?;
        if small.shape.x == 0 || small.shape.y == 0 || small.shape.z == 0 {
            return Err(CoreError::format(
                source_name,
                format!("small brick `{}` has a zero dimension", small.ui_name),
            ));
        }

        Ok(catalog)
    }

    /// The catalog entry used for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Format` if the catalog has no entry for `kind`, or
    /// the large entry lacks an `offset`.
    pub fn entry(&self, kind: BrickKind) -> CoreResult<&CatalogEntry> {
        let entry = self.bricks.get(kind.catalog_index()).ok_or_else(|| {
            CoreError::format(
                "brick catalog",
                format!("no brick at index {} for {kind:?} cells", kind.catalog_index()),
            )
        })?;
        if kind == BrickKind::Large && entry.offset.is_none() {
            return Err(CoreError::format(
                "brick catalog",
                format!("large brick `{}` has no `offset`", entry.ui_name),
            ));
        }
        Ok(entry)
    }

    /// Height of the small brick in plates; the unit of vertical stacking.
    #[must_use]
    pub fn base_height(&self) -> u32 {
        self.bricks.first().map_or(1, |b| b.shape.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = r#"{
        "bricks": [
            { "shape": [1, 1, 1], "ui_name": "1x1f" },
            { "shape": [2, 2, 1], "ui_name": "2x2f", "offset": [0.25, 0.25] }
        ]
    }"#;

    #[test]
    fn test_parse_default_catalog() {
        let catalog = BrickCatalog::from_json_str("default", DEFAULT).unwrap();
        assert_eq!(catalog.bricks.len(), 2);
        assert_eq!(catalog.base_height(), 1);

        let small = catalog.entry(BrickKind::Small).unwrap();
        assert_eq!(small.ui_name, "1x1f");
        assert_eq!(small.shape, BrickShape::new(1, 1, 1));
        assert_eq!(small.offset, None);

        let large = catalog.entry(BrickKind::Large).unwrap();
        assert_eq!(large.shape, BrickShape::new(2, 2, 1));
        assert_eq!(large.offset, Some([0.25, 0.25]));
    }

    #[test]
    fn test_small_only_catalog_has_no_large_entry() {
        let catalog = BrickCatalog::from_json_str(
            "small",
            r#"{ "bricks": [ { "shape": [1, 1, 3], "ui_name": "1x1" } ] }"#,
        )
        .unwrap();
        assert_eq!(catalog.base_height(), 3);
        assert!(matches!(
            catalog.entry(BrickKind::Large),
            Err(CoreError::Format { .. })
        ));
    }

    #[test]
    fn test_large_without_offset_rejected() {
        let catalog = BrickCatalog::from_json_str(
            "nooffset",
            r#"{ "bricks": [
                { "shape": [1, 1, 1], "ui_name": "1x1f" },
                { "shape": [2, 2, 1], "ui_name": "2x2f" }
            ] }"#,
        )
        .unwrap();
        assert!(catalog.entry(BrickKind::Small).is_ok());
        assert!(catalog.entry(BrickKind::Large).is_err());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            BrickCatalog::from_json_str("x", "{ not json"),
            Err(CoreError::Format { .. })
        ));
        assert!(matches!(
            BrickCatalog::from_json_str("x", r#"{ "bricks": [] }"#),
            Err(CoreError::Format { .. })
        ));
        assert!(matches!(
            BrickCatalog::from_json_str("x", r#"{ "bricks": [ { "shape": [1, 1], "ui_name": "a" } ] }"#),
            Err(CoreError::Format { .. })
        ));
        assert!(matches!(
            BrickCatalog::from_json_str("x", r#"{ "bricks": [ { "shape": [1, 0, 1], "ui_name": "a" } ] }"#),
            Err(CoreError::Format { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            BrickCatalog::load("/no/such/defaultBricks.json"),
            Err(CoreError::NotFound { .. })
        ));
    }
}
