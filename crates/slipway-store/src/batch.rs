use std::collections::BTreeMap;

use slipway_types::Oid;
use tracing::debug;

use crate::error::StoreResult;
use crate::object::{Object, StoredObject};
use crate::traits::ObjectStore;

/// Accumulator for newly minted objects awaiting persistence.
///
/// Keyed by content hash, so a rebuilt ancestor recorded from several call
/// sites lands in the batch exactly once, no matter how many rewrites
/// touched it. Iteration follows hash order, which is stable across runs.
#[derive(Clone, Debug, Default)]
pub struct ObjectBatch {
    objects: BTreeMap<Oid, Object>,
}

impl ObjectBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
        }
    }

    /// Record an object, keyed by its content hash. Returns the hash.
    ///
    /// Inserting an object that is already present is a no-op.
    pub fn insert(&mut self, object: Object) -> Oid {
        let id = object.id();
        self.objects.entry(id).or_insert(object);
        id
    }

    /// Returns `true` if the batch holds an object with this hash.
    pub fn contains(&self, id: &Oid) -> bool {
        self.objects.contains_key(id)
    }

    /// Look up an object by hash.
    pub fn get(&self, id: &Oid) -> Option<&Object> {
        self.objects.get(id)
    }

    /// Drop an object from the batch, returning it if present.
    ///
    /// Used when a minted object is superseded before persistence (e.g. an
    /// intermediate root tree replaced by a later rewrite).
    pub fn remove(&mut self, id: &Oid) -> Option<Object> {
        self.objects.remove(id)
    }

    /// Number of objects in the batch.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object hashes in hash order.
    pub fn ids(&self) -> Vec<Oid> {
        self.objects.keys().copied().collect()
    }

    /// Iterate over (hash, object) pairs in hash order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &Object)> {
        self.objects.iter()
    }

    /// Fold another batch into this one. Shared hashes collapse to a
    /// single object.
    pub fn merge(&mut self, other: ObjectBatch) {
        for (id, object) in other.objects {
            self.objects.entry(id).or_insert(object);
        }
    }

    /// Validate every object in the batch, failing on the first
    /// ill-formed one.
    pub fn validate_all(&self) -> StoreResult<()> {
        for object in self.objects.values() {
            object.validate()?;
        }
        Ok(())
    }

    /// Write every object to the store. Returns the written IDs in hash
    /// order.
    pub fn persist(&self, store: &dyn ObjectStore) -> StoreResult<Vec<Oid>> {
        debug!(count = self.len(), "persisting object batch");
        let stored: Vec<StoredObject> = self
            .objects
            .values()
            .map(|object| object.to_stored_object())
            .collect();
        store.write_batch(&stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;
    use crate::object::{Blob, Tree, TreeEntry};
    use crate::traits::ObjectRead;
    use slipway_types::FileMode;

    fn blob(content: &[u8]) -> Object {
        Blob::new(content.to_vec()).into()
    }

    #[test]
    fn insert_returns_content_id() {
        let mut batch = ObjectBatch::new();
        let id = batch.insert(blob(b"hello"));
        assert_eq!(id, Blob::new(b"hello".to_vec()).id());
        assert!(batch.contains(&id));
    }

    #[test]
    fn insert_dedups_by_content() {
        let mut batch = ObjectBatch::new();
        let id1 = batch.insert(blob(b"same"));
        let id2 = batch.insert(blob(b"same"));
        assert_eq!(id1, id2);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn remove_drops_object() {
        let mut batch = ObjectBatch::new();
        let id = batch.insert(blob(b"superseded"));
        assert!(batch.remove(&id).is_some());
        assert!(!batch.contains(&id));
        assert!(batch.remove(&id).is_none());
        assert!(batch.is_empty());
    }

    #[test]
    fn ids_are_in_hash_order() {
        let mut batch = ObjectBatch::new();
        batch.insert(blob(b"one"));
        batch.insert(blob(b"two"));
        batch.insert(blob(b"three"));
        let ids = batch.ids();
        for w in ids.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn merge_collapses_shared_objects() {
        let mut left = ObjectBatch::new();
        left.insert(blob(b"shared"));
        left.insert(blob(b"left-only"));

        let mut right = ObjectBatch::new();
        right.insert(blob(b"shared"));
        right.insert(blob(b"right-only"));

        left.merge(right);
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn validate_all_accepts_well_formed() {
        let mut batch = ObjectBatch::new();
        batch.insert(blob(b"fine"));
        batch.insert(
            Tree::new(vec![TreeEntry::new(
                FileMode::Regular,
                "f.txt",
                Blob::new(b"fine".to_vec()).id(),
            )])
            .into(),
        );
        batch.validate_all().unwrap();
    }

    #[test]
    fn validate_all_rejects_ill_formed_tree() {
        let mut batch = ObjectBatch::new();
        let bad = Tree::new(vec![TreeEntry::new(
            FileMode::Regular,
            "a/b",
            Oid::from_raw([1; 20]),
        )]);
        batch.insert(bad.into());
        assert!(batch.validate_all().is_err());
    }

    #[test]
    fn persist_writes_every_object() {
        let store = InMemoryObjectStore::new();
        let mut batch = ObjectBatch::new();
        let id1 = batch.insert(blob(b"first"));
        let id2 = batch.insert(blob(b"second"));

        let written = batch.persist(&store).unwrap();
        assert_eq!(written.len(), 2);
        assert!(store.exists(&id1).unwrap());
        assert!(store.exists(&id2).unwrap());
    }

    #[test]
    fn persist_empty_batch_writes_nothing() {
        let store = InMemoryObjectStore::new();
        let batch = ObjectBatch::new();
        assert!(batch.persist(&store).unwrap().is_empty());
        assert!(store.is_empty());
    }
}
