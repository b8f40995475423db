//! Error types for the explorer crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing a directory.
///
/// An empty directory is not an error; it lists successfully with no entries.
#[derive(Debug, Error)]
pub enum ListError {
    /// The requested path does not exist.
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    /// The directory exists but cannot be read.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The requested path is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ListError {
    /// Classify an IO error raised for `path`.
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ListError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                ListError::PermissionDenied(path.to_path_buf())
            }
            _ => ListError::Io(err),
        }
    }
}

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, ListError>;
