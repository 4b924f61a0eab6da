use slipway_store::StoreError;
use thiserror::Error;

/// Errors from tree path operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A path segment is absent from the tree being walked, or an
    /// intermediate segment is not a directory.
    #[error("path not found: no entry {segment:?} while walking {path:?}")]
    PathNotFound { path: String, segment: String },

    /// The supplied path cannot be split into segments.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// Failure from the underlying object store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
