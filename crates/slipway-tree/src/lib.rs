//! Path resolution and copy-on-write tree rewriting for slipway.
//!
//! A snapshot is a tree of immutable objects; editing one leaf means
//! minting a new blob and rebuilding every tree from that leaf up to the
//! root, while every untouched subtree keeps being shared by reference.
//! This crate implements that walk in both directions:
//!
//! - [`resolve_path`] -- walk a slash-delimited path down from a root
//!   tree to its (mode, hash) pair
//! - [`PathRewriter`] -- point a path at a new leaf, collecting the
//!   rebuilt trees in an [`ObjectBatch`](slipway_store::ObjectBatch)
//!
//! The rewriter never writes to the store: minted trees stay in the
//! batch until the caller persists them.

pub mod error;
pub mod path;
pub mod rewrite;

pub use error::{TreeError, TreeResult};
pub use path::resolve_path;
pub use rewrite::{rewrite_path, PathRewriter};
