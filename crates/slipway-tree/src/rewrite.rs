use std::collections::BTreeSet;

use slipway_store::{Object, ObjectBatch, ObjectRead, Tree, TreeEntry};
use slipway_types::{FileMode, Oid};
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::path::split_path;

/// Copy-on-write path rewriter over an immutable object store.
///
/// Each [`rewrite_path`](PathRewriter::rewrite_path) call rebuilds the
/// chain of trees from the edited leaf up to the root, minting new tree
/// objects while every untouched sibling stays shared by reference.
/// Minted trees accumulate in an internal [`ObjectBatch`]; successive
/// calls thread through roots minted by earlier ones. After each call
/// the batch is pruned to the trees reachable from the returned root,
/// so it always holds exactly the trees of the newest graph: a tree
/// superseded by a later rewrite falls out, while one referenced from
/// several entries stays as long as any reference remains.
pub struct PathRewriter<'a> {
    store: &'a dyn ObjectRead,
    minted: ObjectBatch,
}

impl<'a> PathRewriter<'a> {
    /// Create a rewriter reading from `store`.
    pub fn new(store: &'a dyn ObjectRead) -> Self {
        Self {
            store,
            minted: ObjectBatch::new(),
        }
    }

    /// Trees minted so far, keyed by content hash.
    pub fn minted(&self) -> &ObjectBatch {
        &self.minted
    }

    /// Consume the rewriter, returning the minted trees.
    pub fn into_minted(self) -> ObjectBatch {
        self.minted
    }

    /// Point `path` (slash-delimited, relative to `root`) at a new
    /// (mode, hash) leaf, rebuilding every tree along the way, and
    /// return the new root hash.
    ///
    /// Fails with [`TreeError::PathNotFound`] if a segment is absent or
    /// an intermediate segment is not a directory: a rewrite replaces an
    /// existing leaf, it never creates directories. On failure nothing
    /// is added to the batch.
    pub fn rewrite_path(
        &mut self,
        root: &Oid,
        path: &str,
        mode: FileMode,
        target: Oid,
    ) -> TreeResult<Oid> {
        let segments = split_path(path)?;
        let root_tree = self.load_tree(root)?;
        let new_root = self.rewrite_tree(root_tree, &segments, path, mode, target)?;
        self.prune_unreachable(&new_root);
        debug!(
            old_root = %root.short_hex(),
            new_root = %new_root.short_hex(),
            path,
            "rewrote tree path"
        );
        Ok(new_root)
    }

    /// Fetch a tree, preferring ones minted by an earlier rewrite that
    /// the store has never seen.
    fn load_tree(&self, id: &Oid) -> TreeResult<Tree> {
        if let Some(Object::Tree(tree)) = self.minted.get(id) {
            return Ok(tree.clone());
        }
        Ok(self.store.get_tree(id)?)
    }

    fn rewrite_tree(
        &mut self,
        mut tree: Tree,
        segments: &[&str],
        full_path: &str,
        mode: FileMode,
        target: Oid,
    ) -> TreeResult<Oid> {
        let not_found = |segment: &str| TreeError::PathNotFound {
            path: full_path.to_string(),
            segment: segment.to_string(),
        };

        match segments {
            [] => Err(TreeError::InvalidPath(full_path.to_string())),
            [leaf] => {
                tree.set_entry(TreeEntry::new(mode, *leaf, target));
                Ok(self.minted.insert(tree.into()))
            }
            [head, rest @ ..] => {
                let (child_id, child_mode) = {
                    let entry = tree.get(head).ok_or_else(|| not_found(head))?;
                    if !entry.mode.is_directory() {
                        return Err(not_found(head));
                    }
                    (entry.oid, entry.mode)
                };
                let child = self.load_tree(&child_id)?;
                let new_child = self.rewrite_tree(child, rest, full_path, mode, target)?;
                tree.set_entry(TreeEntry::new(child_mode, *head, new_child));
                Ok(self.minted.insert(tree.into()))
            }
        }
    }

    /// Drop minted trees no longer reachable from `root`.
    fn prune_unreachable(&mut self, root: &Oid) {
        let mut live = BTreeSet::new();
        let mut stack = vec![*root];
        while let Some(id) = stack.pop() {
            if !live.insert(id) {
                continue;
            }
            if let Some(Object::Tree(tree)) = self.minted.get(&id) {
                for entry in tree.entries() {
                    stack.push(entry.oid);
                }
            }
        }
        for id in self.minted.ids() {
            if !live.contains(&id) {
                self.minted.remove(&id);
            }
        }
    }
}

/// One-shot path rewrite: returns the new root hash together with the
/// trees minted along the way.
pub fn rewrite_path(
    store: &dyn ObjectRead,
    root: &Oid,
    path: &str,
    mode: FileMode,
    target: Oid,
) -> TreeResult<(Oid, ObjectBatch)> {
    let mut rewriter = PathRewriter::new(store);
    let new_root = rewriter.rewrite_path(root, path, mode, target)?;
    Ok((new_root, rewriter.into_minted()))
}
