use slipway_store::{ObjectRead, Tree};
use slipway_types::{FileMode, Oid};

use crate::error::{TreeError, TreeResult};

/// Split a slash-delimited path into segments.
///
/// Empty paths and paths with empty segments (leading, doubled, or
/// trailing slashes) are rejected.
pub(crate) fn split_path(path: &str) -> TreeResult<Vec<&str>> {
    if path.is_empty() {
        return Err(TreeError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(TreeError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Resolve a slash-delimited path from a root tree to the (mode, hash)
/// pair it names.
///
/// Fails with [`TreeError::PathNotFound`] at the first missing segment.
/// An intermediate segment that exists but is not a directory counts as
/// missing: there is nothing to descend into.
pub fn resolve_path(
    store: &dyn ObjectRead,
    root: &Tree,
    path: &str,
) -> TreeResult<(FileMode, Oid)> {
    let segments = split_path(path)?;
    let not_found = |segment: &str| TreeError::PathNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let (leaf, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Err(TreeError::InvalidPath(path.to_string())),
    };

    let mut current = root.clone();
    for segment in parents {
        let entry = current.get(segment).ok_or_else(|| not_found(segment))?;
        if !entry.mode.is_directory() {
            return Err(not_found(segment));
        }
        let child = store.get_tree(&entry.oid)?;
        current = child;
    }

    let entry = current.get(leaf).ok_or_else(|| not_found(leaf))?;
    Ok((entry.mode, entry.oid))
}
