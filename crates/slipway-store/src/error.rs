use slipway_types::Oid;

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// An object holds a different kind than the caller asked for.
    #[error("object {id} is a {actual}, expected {expected}")]
    TypeMismatch {
        id: Oid,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The object data is malformed and cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: Oid, reason: String },

    /// A constructed object failed self-consistency validation.
    #[error("invalid object {id}: {reason}")]
    InvalidObject { id: Oid, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
