//! Error types for the editor core.
//!
//! Editing itself never fails: bad indices clamp, stale drags abort, missing
//! focus targets retry. The fallible edges are loading configuration and
//! strict parsing of stored note content.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid RON for the expected shape.
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A tuning value is out of its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Errors from strict content parsing.
///
/// The lenient parser never fails; it keeps unrecognized lines as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A `::name::` marker that names no block kind.
    #[error("line {line}: unknown block marker '::{marker}::'")]
    UnknownMarker { line: usize, marker: String },

    /// A `:::` continuation line before any block.
    #[error("line {line}: continuation with no block to continue")]
    OrphanContinuation { line: usize },
}
