//! Builds release commits from rewritten snapshots.

use slipway_store::{Blob, Commit, ObjectBatch, ObjectRead};
use slipway_tree::{resolve_path, PathRewriter, TreeError};
use slipway_types::{Identity, Oid};
use tracing::{debug, info};

use crate::assign::{find_assignment, replace_assignment};
use crate::clock::Clock;
use crate::error::{ReleaseError, ReleaseResult};

/// Manifest file expected at the snapshot root.
pub const MANIFEST_FILE: &str = "setup.py";

/// Manifest assignment naming the package.
const PACKAGE_NAME_ASSIGNMENT: &str = "name";

/// Manifest assignment carrying the release version.
const MANIFEST_VERSION_ASSIGNMENT: &str = "version";

/// Marker assignment carrying the release version.
const MARKER_VERSION_ASSIGNMENT: &str = "__version__";

/// Encoding header stamped on prepared commits.
const COMMIT_ENCODING: &str = "utf8";

/// Outcome of [`prepare_release_commit`].
///
/// Holds the new commit and every object minted for it. Nothing has
/// been persisted: the caller inspects the result and writes `objects`
/// to a store in one explicit step when satisfied.
#[derive(Clone, Debug)]
pub struct PreparedRelease {
    /// The prepared release commit.
    pub commit: Commit,
    /// Content-addressed ID of `commit`.
    pub commit_id: Oid,
    /// Root tree the commit points at.
    pub root_tree: Oid,
    /// Every object minted for this release: rewritten blobs, rebuilt
    /// trees, and the commit itself.
    pub objects: ObjectBatch,
    /// Path of the version marker that was rewritten, when the package
    /// has one.
    pub marker_path: Option<String>,
}

/// Prepare the commit that releases `new_version` on top of `parent`.
///
/// Reads the snapshot `parent` points at and rewrites its version
/// strings:
///
/// 1. `setup.py` at the root names the package and must exist; its
///    `version` assignment is set to `new_version`.
/// 2. `<package>/__init__.py` is the package's version marker; when it
///    exists its `__version__` assignment is set too, and when it does
///    not the step is skipped with a log line.
///
/// The rewritten blobs, the rebuilt trees, and the release commit
/// itself come back in an [`ObjectBatch`]; the store is never written.
/// The commit carries `author` as both author and committer, one
/// identical timestamp from `clock` for both, and exactly one parent.
/// Every minted object is validated before the batch is returned.
pub fn prepare_release_commit(
    store: &dyn ObjectRead,
    parent: &Oid,
    new_version: &str,
    author: &Identity,
    message: &str,
    clock: &dyn Clock,
) -> ReleaseResult<PreparedRelease> {
    debug!(
        parent = %parent.short_hex(),
        version = new_version,
        "preparing release commit"
    );
    let parent_commit = store.get_commit(parent)?;
    let root = store.get_tree(&parent_commit.tree)?;

    let manifest_entry = root
        .get(MANIFEST_FILE)
        .cloned()
        .ok_or_else(|| ReleaseError::ManifestNotFound(MANIFEST_FILE.to_string()))?;
    let manifest_text = read_text(store, &manifest_entry.oid, MANIFEST_FILE)?;
    let package = find_assignment(&manifest_text, PACKAGE_NAME_ASSIGNMENT)?;
    debug!(package = %package, "package name from manifest");

    let mut rewriter = PathRewriter::new(store);
    let mut blobs: Vec<Blob> = Vec::new();
    let mut current_root = parent_commit.tree;

    let marker_path = format!("{package}/__init__.py");
    let rewrote_marker = match resolve_path(store, &root, &marker_path) {
        Ok((mode, blob_id)) => {
            let text = read_text(store, &blob_id, &marker_path)?;
            let replaced = replace_assignment(&text, MARKER_VERSION_ASSIGNMENT, new_version)?;
            let blob = Blob::new(replaced.into_bytes());
            current_root = rewriter.rewrite_path(&current_root, &marker_path, mode, blob.id())?;
            blobs.push(blob);
            debug!(path = %marker_path, "rewrote version marker");
            true
        }
        Err(TreeError::PathNotFound { .. }) => {
            debug!(path = %marker_path, "package has no version marker, skipping");
            false
        }
        Err(err) => return Err(err.into()),
    };

    let manifest_replaced =
        replace_assignment(&manifest_text, MANIFEST_VERSION_ASSIGNMENT, new_version)?;
    let manifest_blob = Blob::new(manifest_replaced.into_bytes());
    current_root = rewriter.rewrite_path(
        &current_root,
        MANIFEST_FILE,
        manifest_entry.mode,
        manifest_blob.id(),
    )?;
    blobs.push(manifest_blob);

    let now = clock.now();
    let commit = Commit {
        tree: current_root,
        parents: vec![*parent],
        author: author.clone(),
        author_time: now,
        committer: author.clone(),
        commit_time: now,
        encoding: Some(COMMIT_ENCODING.to_string()),
        message: message.to_string(),
    };
    let commit_id = commit.id();

    let mut objects = rewriter.into_minted();
    for blob in blobs {
        objects.insert(blob.into());
    }
    objects.insert(commit.clone().into());
    objects.validate_all()?;

    info!(
        commit = %commit_id.short_hex(),
        tree = %current_root.short_hex(),
        package = %package,
        version = new_version,
        objects = objects.len(),
        "prepared release commit"
    );

    Ok(PreparedRelease {
        commit,
        commit_id,
        root_tree: current_root,
        objects,
        marker_path: rewrote_marker.then_some(marker_path),
    })
}

fn read_text(store: &dyn ObjectRead, id: &Oid, path: &str) -> ReleaseResult<String> {
    let blob = store.get_blob(id)?;
    String::from_utf8(blob.data).map_err(|_| ReleaseError::NotText {
        path: path.to_string(),
    })
}
