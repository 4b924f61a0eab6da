use slipway_store::StoreError;
use slipway_tree::TreeError;
use thiserror::Error;

/// Errors returned while preparing a release commit.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The snapshot root has no manifest file to rewrite.
    #[error("manifest {0} not found at the snapshot root")]
    ManifestNotFound(String),

    /// A file that must be rewritten does not assign the expected name.
    #[error("no quoted assignment to {name} found")]
    AssignmentNotFound { name: String },

    /// A file that must be rewritten is not valid UTF-8.
    #[error("{path} is not valid UTF-8 text")]
    NotText { path: String },

    /// The assignment pattern for a name failed to compile.
    #[error("invalid assignment pattern for {name}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Path resolution or tree rewriting failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// An object lookup or validation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for release preparation.
pub type ReleaseResult<T> = Result<T, ReleaseError>;
