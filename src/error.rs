//! Error types for the library.
//!
//! The single error type is `FileError`. Every variant carries the path the
//! operation was acting on; variants caused by an underlying I/O failure carry
//! the `io::Error` as well.
//!
//! Two operations deliberately do not report through this type: size queries
//! return 0 on failure and `rename` returns a bool. Both contracts are
//! documented on the functions themselves.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Errors surfaced by file, directory, property and archive operations.
///
/// All failures are reported immediately to the caller; nothing is retried.
#[derive(Debug)]
pub enum FileError {
    /// A path or resource was absent when it was required to exist.
    NotFound {
        path: PathBuf,
        source: Option<io::Error>,
    },

    /// A file or directory could not be created.
    CreationFailed { path: PathBuf, source: io::Error },

    /// A file or directory could not be deleted.
    DeletionFailed { path: PathBuf, source: io::Error },

    /// Checksum or size mismatch, unreadable content, or a decode failure.
    Corrupted { path: PathBuf, reason: String },

    /// A zip archive could not be opened, parsed or extracted.
    Archive { path: PathBuf, source: io::Error },
}

impl Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path, .. } => {
                write!(f, "Resource not found: {}", path.display())
            }
            Self::CreationFailed { path, source } => {
                write!(f, "Failed to create {}: {}", path.display(), source)
            }
            Self::DeletionFailed { path, source } => {
                write!(f, "Failed to delete {}: {}", path.display(), source)
            }
            Self::Corrupted { path, reason } => {
                write!(f, "Corrupted resource {}: {}", path.display(), reason)
            }
            Self::Archive { path, source } => {
                write!(f, "Archive error on {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for FileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { source, .. } => {
                source.as_ref().map(|e| e as &(dyn Error + 'static))
            }
            Self::CreationFailed { source, .. }
            | Self::DeletionFailed { source, .. }
            | Self::Archive { source, .. } => Some(source),
            Self::Corrupted { .. } => None,
        }
    }
}

impl FileError {
    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<u32> {
        match self {
            Self::NotFound { source, .. } => {
                source.as_ref().and_then(|e| e.raw_os_error()).map(|e| e as u32)
            }
            Self::CreationFailed { source, .. }
            | Self::DeletionFailed { source, .. }
            | Self::Archive { source, .. } => source.raw_os_error().map(|e| e as u32),
            Self::Corrupted { .. } => None,
        }
    }
}
