//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only `InvalidRoot`, `Cancelled`, `NothingSelected` and `Io` ever escape a core
/// operation. `DirectoryUnreadable`, `GitignoreUnreadable` and `FileUnreadable` are
/// recovered where they occur; they exist so the recovery sites can log a typed error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The scan root does not exist or is not a directory.
    #[error("Path is not a valid directory: {0}")]
    InvalidRoot(PathBuf),

    /// Listing the children of a directory below the root failed.
    #[error("Cannot read directory {1}: {0}")]
    DirectoryUnreadable(#[source] std::io::Error, PathBuf),

    /// The root `.gitignore` exists but could not be read as UTF-8 text.
    #[error("Cannot read .gitignore at {1}: {0}")]
    GitignoreUnreadable(#[source] std::io::Error, PathBuf),

    /// A selected file could not be read while exporting.
    #[error("Cannot read file {1}: {0}")]
    FileUnreadable(#[source] std::io::Error, PathBuf),

    /// Represents an I/O error, typically from writing the export file.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// Represents an error that occurred when a Tokio task was joined.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// An export was requested with no files selected.
    #[error("No files selected for export")]
    NothingSelected,

    /// The operation was superseded or cancelled by the user.
    #[error("Operation was cancelled")]
    Cancelled,
}
