//! # Core Error Types
//!
//! All errors that can occur between loading a palette and writing a save file.

use thiserror::Error;

/// Errors that can occur in the conversion pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A palette, catalog or image source does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// A source document could not be parsed, or cannot be encoded.
    #[error("{source_name}{}: {reason}", .line.map(|l| format!(" line {l}")).unwrap_or_default())]
    Format {
        /// Identifier of the offending source (usually its path).
        source_name: String,
        /// 1-based line number, when the error is tied to one line.
        line: Option<usize>,
        /// What was wrong.
        reason: String,
    },

    /// Height and color grids disagree on their dimensions.
    #[error(
        "height grid is {}x{} but color grid is {}x{}",
        .height.0, .height.1, .color.0, .color.1
    )]
    ShapeMismatch {
        /// Height grid shape as (rows, cols).
        height: (usize, usize),
        /// Color grid shape as (rows, cols).
        color: (usize, usize),
    },

    /// A required parameter is empty or out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The filesystem refused a read or write.
    #[error("i/o error on {path}: {reason}")]
    Io {
        /// The path being accessed.
        path: String,
        /// The underlying OS error, rendered.
        reason: String,
    },
}

impl CoreError {
    /// Builds a `Format` error tied to a specific line.
    #[must_use]
    pub fn format_at(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            source_name: source_name.to_string(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Builds a `Format` error for a whole document.
    #[must_use]
    pub fn format(source_name: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            source_name: source_name.to_string(),
            line: None,
            reason: reason.into(),
        }
    }

    /// Maps an I/O error on `path`, turning `NotFound` into [`CoreError::NotFound`].
    #[must_use]
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_string(),
            }
        } else {
            Self::Io {
                path: path.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Rejects empty or whitespace-only string parameters.
///
/// # Errors
///
/// Returns `CoreError::InvalidParameter` naming `what` if `value` is blank.
pub fn require_non_blank(what: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidParameter(format!("{what} must not be empty")));
    }
    Ok(())
}
