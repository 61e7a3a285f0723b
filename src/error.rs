//! Error taxonomy for reconciliation passes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The target directory or an entry disappeared between listing and
    /// acting on it (race with concurrent filesystem mutation).
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    /// Insufficient rights to list, stat, or delete an entry.
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A directory-removal step encountered unexpected remaining content
    /// (something was added after this pass's listing completed).
    #[error("directory not empty: {path}")]
    NotEmpty { path: PathBuf },

    /// The supplied root is not a directory, or a whitelist entry failed
    /// validation.
    #[error("invalid input for {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// The cancellation flag was observed set at entry to a recursive call.
    /// Already-deleted entries stay deleted; unvisited entries are untouched.
    #[error("reconciliation cancelled")]
    Cancelled,

    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReconcileError {
    /// Classify an io error against the path it occurred on.
    pub(crate) fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ReconcileError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => ReconcileError::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::DirectoryNotEmpty => ReconcileError::NotEmpty {
                path: path.to_path_buf(),
            },
            _ => ReconcileError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}
