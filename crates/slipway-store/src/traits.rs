use slipway_types::Oid;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, Object, StoredObject, Tree};

/// Read side of a content-addressed object store.
///
/// Release preparation, tree rewriting, and export depend on this trait
/// alone: they fetch pre-existing immutable objects and never write.
/// Newly minted objects travel in an
/// [`ObjectBatch`](crate::batch::ObjectBatch) until the caller persists
/// them through [`ObjectStore`] in one explicit step.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees
///   this: the same data always produces the same ID.
/// - Concurrent reads are always safe (objects are immutable).
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectRead: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &Oid) -> StoreResult<Option<StoredObject>>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &Oid) -> StoreResult<bool>;

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each ID. Backends may
    /// override for better performance (e.g., fewer I/O round-trips).
    fn read_batch(&self, ids: &[Oid]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Read an object, treating absence as an error.
    fn get(&self, id: &Oid) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read and decode an object of any kind.
    fn get_object(&self, id: &Oid) -> StoreResult<Object> {
        Object::from_stored_object(&self.get(id)?)
    }

    /// Read and decode a blob.
    fn get_blob(&self, id: &Oid) -> StoreResult<Blob> {
        Blob::from_stored_object(&self.get(id)?)
    }

    /// Read and decode a tree.
    fn get_tree(&self, id: &Oid) -> StoreResult<Tree> {
        Tree::from_stored_object(&self.get(id)?)
    }

    /// Read and decode a commit.
    fn get_commit(&self, id: &Oid) -> StoreResult<Commit> {
        Commit::from_stored_object(&self.get(id)?)
    }
}

/// Full object store: reads plus the write path.
///
/// Only persistence code needs this trait. Everything else should ask
/// for [`ObjectRead`] so the type system rules out stray writes.
pub trait ObjectStore: ObjectRead {
    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    /// The returned ID is computed from the object's kind and data.
    fn write(&self, object: &StoredObject) -> StoreResult<Oid>;

    /// Write multiple objects in a batch and return their IDs.
    ///
    /// Default implementation calls `write()` for each object. Backends
    /// may override for better performance (e.g., single fsync).
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<Oid>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
