//! Content-addressed object storage for slipway.
//!
//! This crate implements a hash-keyed object store compatible with git's
//! loose object format. Every piece of data slipway touches -- blobs,
//! trees, commits -- is an immutable object identified by the SHA-1 hash
//! of its framed encoding, so objects minted here are readable by any
//! standard tooling pointed at the same store.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, symlink targets)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- snapshot of a tree with ancestry and authorship
//!
//! # Storage Access
//!
//! Reading goes through [`ObjectRead`]; writing through [`ObjectStore`].
//! Release preparation only ever holds the read side: newly minted objects
//! accumulate in an [`ObjectBatch`] and reach the store in one explicit
//! persist step, so a caller can batch several operations or abort after
//! validation without side effects.
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. An edit never mutates in place -- it mints a new object and relinks
//!    ancestors.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value
//!    store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod batch;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use batch::ObjectBatch;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, Object, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::{ObjectRead, ObjectStore};
