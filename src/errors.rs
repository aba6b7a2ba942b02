//! Defines application-specific error types.
//!
//! Only whole-operation failures live here: a bad scan root, an interrupted
//! run, an ignore table that would not compile. Per-entry problems (an
//! unreadable file, a directory that vanished mid-scan) are recovered locally
//! and recorded on the affected `FileRecord`, never surfaced as an `Error`.

use thiserror::Error;

/// Errors that abort an entire scan or aggregation.
#[derive(Error, Debug)]
pub enum Error {
    /// Error occurring during file or directory access (read, write, metadata).
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        /// The path that caused the I/O error.
        path: String,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// The requested scan/aggregation root failed validation or is not a directory.
    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    /// The built-in or caller-supplied ignore patterns could not be compiled.
    #[error("Failed to compile ignore patterns: {0}")]
    IgnorePatterns(String),

    /// The operation was cancelled through its `CancellationToken`.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper to create an `Error::Io` with path context.
pub fn io_error_with_path<P: AsRef<std::path::Path>>(source: std::io::Error, path: P) -> Error {
    Error::Io {
        path: path.as_ref().display().to_string(),
        source,
    }
}
