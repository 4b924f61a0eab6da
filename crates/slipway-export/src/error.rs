use std::path::PathBuf;

use slipway_store::StoreError;
use slipway_types::FileMode;
use thiserror::Error;

/// Errors returned when materializing a snapshot onto the filesystem.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination directory already holds entries.
    #[error("destination {} is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    /// The tree holds an entry kind with no filesystem representation.
    #[error("unsupported entry kind {mode} at {}", .path.display())]
    UnsupportedEntry { path: PathBuf, mode: FileMode },

    /// This platform cannot create symbolic links.
    #[error("cannot create symlink {} on this platform", .0.display())]
    SymlinkUnsupported(PathBuf),

    /// An object lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A filesystem operation failed.
    #[error("filesystem error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
