//! Snapshot export for slipway.
//!
//! A snapshot in the object store is a tree of blobs. This crate walks
//! such a tree and writes it out under an empty destination directory,
//! turning stored entries back into regular files, executables,
//! symlinks, and directories.
//!
//! - [`export_tree`] -- write a tree's contents under a directory
//! - [`export_commit`] -- write the snapshot a commit points at
//!
//! The exporter only ever reads: it takes
//! [`ObjectRead`](slipway_store::ObjectRead) and cannot touch the store.

pub mod error;
pub mod exporter;

pub use error::{ExportError, ExportResult};
pub use exporter::{export_commit, export_tree};
