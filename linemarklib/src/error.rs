//! Error types for linemarklib

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while counting, decorating or scanning.
///
/// The first five variants are the per-file failure taxonomy. Decoration,
/// aggregation and scan paths swallow them; they only reach callers of the
/// lower-level APIs such as [`count_file`](crate::count_file).
#[derive(Error, Debug)]
pub enum LinemarkError {
    /// The file or directory does not exist
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// Access was denied by the filesystem
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory or special file where a regular file was expected
    #[error("not a regular file: {0}")]
    NotRegularFile(PathBuf),

    /// The file exceeds the configured size ceiling
    #[error("file '{path}' is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Generic I/O fault while reading
    #[error("failed to read '{path}': {source}")]
    ReadFailure { path: PathBuf, source: io::Error },

    /// Invalid glob pattern in the configuration
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Configuration could not be loaded or failed validation
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Git operation error
    #[error("git error: {0}")]
    GitError(String),

    /// A workspace scan was started without any existing root
    #[error("no workspace root found")]
    NoWorkspaceRoot,

    /// A workspace scan was cancelled before it finished
    #[error("scan cancelled")]
    Cancelled,
}

impl LinemarkError {
    /// Map an I/O error for `path` onto the failure taxonomy.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::ReadFailure { path, source: err },
        }
    }

    /// Whether this error is one of the per-entry failures that batch
    /// operations treat as "contributes nothing".
    pub fn is_entry_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::PermissionDenied(_)
                | Self::NotRegularFile(_)
                | Self::TooLarge { .. }
                | Self::ReadFailure { .. }
        )
    }
}
