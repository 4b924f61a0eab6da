//! Foundation types for slipway.
//!
//! This crate provides the core identifier, mode, identity, and timestamp
//! types used throughout the slipway release engine. Every other slipway
//! crate depends on `slipway-types`.
//!
//! # Key Types
//!
//! - [`Oid`] -- Content-addressed object identifier (SHA-1 hash)
//! - [`FileMode`] -- Closed set of tree entry modes
//! - [`Identity`] -- Author/committer name and email pair
//! - [`Timestamp`] -- Commit timestamp with UTC offset

pub mod error;
pub mod identity;
pub mod mode;
pub mod oid;
pub mod temporal;

pub use error::TypeError;
pub use identity::Identity;
pub use mode::FileMode;
pub use oid::Oid;
pub use temporal::Timestamp;
