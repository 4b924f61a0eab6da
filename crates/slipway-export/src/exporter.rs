//! Walks a stored tree and writes its contents out as plain files.

use std::fs;
use std::path::Path;

use slipway_store::{ObjectRead, Tree};
use slipway_types::{FileMode, Oid};
use tracing::{debug, info};

use crate::error::{ExportError, ExportResult};

/// Materialize the tree `tree_id` under the directory `dest`.
///
/// `dest` must already exist and be empty. The emptiness check runs
/// before anything is written, so a rejected destination is left
/// untouched. Each tree is validated before its entries are written:
/// an entry name that could climb out of `dest` (`..`, an embedded
/// `/`) aborts the export before any of that tree's entries reach the
/// filesystem. Failures during the walk itself (a missing object, a
/// submodule entry, a full disk) abort the export and may leave a
/// partial copy behind.
///
/// Entry modes map onto the filesystem as follows:
/// - regular files and executables are written byte for byte, the
///   latter with mode `0755`
/// - symlinks become symlinks whose target is the blob content
/// - directories are created with mode `0755` and filled recursively
/// - submodule entries have no filesystem form and fail with
///   [`ExportError::UnsupportedEntry`]
pub fn export_tree(store: &dyn ObjectRead, tree_id: &Oid, dest: &Path) -> ExportResult<()> {
    let mut entries = fs::read_dir(dest).map_err(|e| io_at(dest, e))?;
    if let Some(entry) = entries.next() {
        entry.map_err(|e| io_at(dest, e))?;
        return Err(ExportError::DestinationNotEmpty(dest.to_path_buf()));
    }

    let tree = store.get_tree(tree_id)?;
    export_contents(store, &tree, dest)?;
    info!(tree = %tree_id, dest = %dest.display(), "exported snapshot");
    Ok(())
}

/// Materialize the snapshot a commit points at.
///
/// Resolves the commit's root tree and hands it to [`export_tree`];
/// the same destination rules apply.
pub fn export_commit(store: &dyn ObjectRead, commit_id: &Oid, dest: &Path) -> ExportResult<()> {
    let commit = store.get_commit(commit_id)?;
    export_tree(store, &commit.tree, dest)
}

fn export_contents(store: &dyn ObjectRead, tree: &Tree, dir: &Path) -> ExportResult<()> {
    tree.validate()?;
    for entry in tree.entries() {
        let path = dir.join(&entry.name);
        match entry.mode {
            FileMode::Regular => {
                let blob = store.get_blob(&entry.oid)?;
                fs::write(&path, &blob.data).map_err(|e| io_at(&path, e))?;
                debug!(path = %path.display(), bytes = blob.data.len(), "wrote file");
            }
            FileMode::Executable => {
                let blob = store.get_blob(&entry.oid)?;
                fs::write(&path, &blob.data).map_err(|e| io_at(&path, e))?;
                chmod(&path, 0o755)?;
                debug!(path = %path.display(), bytes = blob.data.len(), "wrote executable");
            }
            FileMode::Symlink => {
                let blob = store.get_blob(&entry.oid)?;
                create_symlink(&blob.data, &path)?;
                debug!(path = %path.display(), "wrote symlink");
            }
            FileMode::Directory => {
                fs::create_dir(&path).map_err(|e| io_at(&path, e))?;
                chmod(&path, 0o755)?;
                debug!(path = %path.display(), "created directory");
                let child = store.get_tree(&entry.oid)?;
                export_contents(store, &child, &path)?;
            }
            FileMode::Submodule => {
                return Err(ExportError::UnsupportedEntry {
                    path,
                    mode: entry.mode,
                });
            }
        }
    }
    Ok(())
}

fn io_at(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn chmod(path: &Path, mode: u32) -> ExportResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| io_at(path, e))
}

#[cfg(not(unix))]
fn chmod(_path: &Path, _mode: u32) -> ExportResult<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &[u8], path: &Path) -> ExportResult<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    std::os::unix::fs::symlink(OsStr::from_bytes(target), path).map_err(|e| io_at(path, e))
}

#[cfg(not(unix))]
fn create_symlink(_target: &[u8], path: &Path) -> ExportResult<()> {
    Err(ExportError::SymlinkUnsupported(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_store::{
        Blob, Commit, InMemoryObjectStore, Object, ObjectStore, StoreError, TreeEntry,
    };
    use slipway_types::{Identity, Timestamp};
    use tempfile::tempdir;

    fn put(store: &InMemoryObjectStore, object: Object) -> Oid {
        store.write(&object.to_stored_object()).unwrap()
    }

    /// Snapshot with one file at the root and one nested directory.
    fn seed(store: &InMemoryObjectStore) -> Oid {
        let readme = put(store, Blob::new(b"docs\n".to_vec()).into());
        let module = put(store, Blob::new(b"pass\n".to_vec()).into());
        let pkg = Tree::new(vec![TreeEntry::new(FileMode::Regular, "util.py", module)]);
        let pkg_id = put(store, pkg.into());
        let root = Tree::new(vec![
            TreeEntry::new(FileMode::Regular, "README", readme),
            TreeEntry::new(FileMode::Directory, "pkg", pkg_id),
        ]);
        put(store, root.into())
    }

    // -----------------------------------------------------------------------
    // Destination guard
    // -----------------------------------------------------------------------

    #[test]
    fn non_empty_destination_fails_without_writing() {
        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let dest = tempdir().unwrap();
        fs::write(dest.path().join("stale"), b"x").unwrap();

        let err = export_tree(&store, &root, dest.path()).unwrap_err();
        assert!(matches!(err, ExportError::DestinationNotEmpty(_)));
        assert!(!dest.path().join("README").exists());
    }

    #[test]
    fn missing_destination_is_an_io_error() {
        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let err = export_tree(&store, &root, Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    #[test]
    fn exports_flat_and_nested_files() {
        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let dest = tempdir().unwrap();

        export_tree(&store, &root, dest.path()).unwrap();

        assert_eq!(fs::read(dest.path().join("README")).unwrap(), b"docs\n");
        assert_eq!(fs::read(dest.path().join("pkg/util.py")).unwrap(), b"pass\n");
    }

    #[test]
    fn export_round_trips_paths_and_contents() {
        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let dest = tempdir().unwrap();

        export_tree(&store, &root, dest.path()).unwrap();

        // re-walk the destination; directories carry no content
        let mut seen: Vec<(String, Option<Vec<u8>>)> = walkdir::WalkDir::new(dest.path())
            .min_depth(1)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let rel = entry
                    .path()
                    .strip_prefix(dest.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned();
                let content = if entry.file_type().is_dir() {
                    None
                } else {
                    Some(fs::read(entry.path()).unwrap())
                };
                (rel, content)
            })
            .collect();
        seen.sort();

        assert_eq!(
            seen,
            [
                ("README".to_string(), Some(b"docs\n".to_vec())),
                ("pkg".to_string(), None),
                ("pkg/util.py".to_string(), Some(b"pass\n".to_vec())),
            ]
        );
    }

    #[test]
    fn missing_tree_is_reported() {
        let store = InMemoryObjectStore::new();
        let dest = tempdir().unwrap();
        let err = export_tree(&store, &Oid::from_raw([7; 20]), dest.path()).unwrap_err();
        assert!(matches!(err, ExportError::Store(_)));
    }

    // -----------------------------------------------------------------------
    // Entry modes
    // -----------------------------------------------------------------------

    #[test]
    fn submodule_entries_cannot_be_exported() {
        let store = InMemoryObjectStore::new();
        let root = put(
            &store,
            Tree::new(vec![TreeEntry::new(
                FileMode::Submodule,
                "vendored",
                Oid::from_raw([0xee; 20]),
            )])
            .into(),
        );
        let dest = tempdir().unwrap();

        let err = export_tree(&store, &root, dest.path()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedEntry {
                mode: FileMode::Submodule,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn directories_are_created_with_mode_755() {
        use std::os::unix::fs::PermissionsExt;

        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let dest = tempdir().unwrap();

        export_tree(&store, &root, dest.path()).unwrap();

        let mode = fs::metadata(dest.path().join("pkg"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn executables_carry_the_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let store = InMemoryObjectStore::new();
        let script = put(&store, Blob::new(b"#!/bin/sh\n".to_vec()).into());
        let root = put(
            &store,
            Tree::new(vec![TreeEntry::new(FileMode::Executable, "run.sh", script)]).into(),
        );
        let dest = tempdir().unwrap();

        export_tree(&store, &root, dest.path()).unwrap();

        let mode = fs::metadata(dest.path().join("run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_point_at_the_blob_content() {
        let store = InMemoryObjectStore::new();
        let target = put(&store, Blob::new(b"README".to_vec()).into());
        let root = put(
            &store,
            Tree::new(vec![TreeEntry::new(FileMode::Symlink, "link", target)]).into(),
        );
        let dest = tempdir().unwrap();

        export_tree(&store, &root, dest.path()).unwrap();

        let link = fs::read_link(dest.path().join("link")).unwrap();
        assert_eq!(link, Path::new("README"));
    }

    // -----------------------------------------------------------------------
    // Ill-formed trees
    // -----------------------------------------------------------------------

    #[test]
    fn hostile_entry_names_cannot_escape_the_destination() {
        let store = InMemoryObjectStore::new();
        let payload = put(&store, Blob::new(b"owned\n".to_vec()).into());
        let root = put(
            &store,
            Tree::new(vec![TreeEntry::new(
                FileMode::Regular,
                "../escape.txt",
                payload,
            )])
            .into(),
        );

        let outer = tempdir().unwrap();
        let dest = outer.path().join("dest");
        fs::create_dir(&dest).unwrap();

        let err = export_tree(&store, &root, &dest).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Store(StoreError::InvalidObject { .. })
        ));
        assert!(!outer.path().join("escape.txt").exists());
        assert!(fs::read_dir(&dest).unwrap().next().is_none());
    }

    #[test]
    fn ill_formed_subtree_fails_the_walk() {
        let store = InMemoryObjectStore::new();
        let payload = put(&store, Blob::new(b"owned\n".to_vec()).into());
        let child = put(
            &store,
            Tree::new(vec![TreeEntry::new(FileMode::Regular, "..", payload)]).into(),
        );
        let root = put(
            &store,
            Tree::new(vec![TreeEntry::new(FileMode::Directory, "pkg", child)]).into(),
        );

        let dest = tempdir().unwrap();

        let err = export_tree(&store, &root, dest.path()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Store(StoreError::InvalidObject { .. })
        ));
        // The subtree was rejected before any of its entries were written.
        assert!(fs::read_dir(dest.path().join("pkg")).unwrap().next().is_none());
    }

    // -----------------------------------------------------------------------
    // Commit export
    // -----------------------------------------------------------------------

    #[test]
    fn export_commit_uses_the_commit_root() {
        let store = InMemoryObjectStore::new();
        let root = seed(&store);
        let commit = Commit {
            tree: root,
            parents: vec![Oid::from_raw([1; 20])],
            author: Identity::new("Ada Lovelace", "ada@example.com"),
            author_time: Timestamp::new(1600000000, 0),
            committer: Identity::new("Ada Lovelace", "ada@example.com"),
            commit_time: Timestamp::new(1600000000, 0),
            encoding: None,
            message: "snapshot\n".to_string(),
        };
        let commit_id = put(&store, commit.into());
        let dest = tempdir().unwrap();

        export_commit(&store, &commit_id, dest.path()).unwrap();

        assert_eq!(fs::read(dest.path().join("README")).unwrap(), b"docs\n");
    }
}
