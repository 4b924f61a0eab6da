//! Release commit preparation for slipway.
//!
//! This crate turns "cut version X" into objects: starting from a
//! parent commit it rewrites the version strings in the snapshot's
//! manifest and package marker, rebuilds the trees on those paths, and
//! wraps the result in a new commit. Everything minted along the way
//! comes back in an [`ObjectBatch`](slipway_store::ObjectBatch) for the
//! caller to persist; the store itself is never written.
//!
//! # Key Types
//!
//! - [`prepare_release_commit`] -- build the full release in one call
//! - [`PreparedRelease`] -- the minted commit plus its objects
//! - [`Clock`] -- time source for commit timestamps
//! - [`find_assignment`] / [`replace_assignment`] -- quoted-assignment
//!   editing for manifest and marker files

pub mod assign;
pub mod builder;
pub mod clock;
pub mod error;

pub use assign::{find_assignment, replace_assignment};
pub use builder::{prepare_release_commit, PreparedRelease, MANIFEST_FILE};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ReleaseError, ReleaseResult};
