//! # Front End Error Types
//!
//! Core pipeline errors pass through unchanged; decoding and config errors
//! are added on top.

use heightbrick_core::CoreError;
use thiserror::Error;

/// Errors that can occur while preparing or running a generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A pipeline stage failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An image exists but could not be decoded or resampled.
    #[error("cannot decode image {path}: {reason}")]
    Image {
        /// Image path.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// A config file is malformed or holds an invalid value.
    #[error("invalid config {path}: {reason}")]
    Config {
        /// Config path, or `<cli>` for command line values.
        path: String,
        /// What is wrong.
        reason: String,
    },
}

/// Result type for front end operations.
pub type AppResult<T> = Result<T, AppError>;
