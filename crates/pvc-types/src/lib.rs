//! Foundation types for the persistent version-control core.
//!
//! Every other `pvc-*` crate depends on `pvc-types`.
//!
//! # Key Types
//!
//! - [`BlobId`] -- Content-addressed identifier of a file's bytes
//! - [`CommitId`] -- Content-inclusive identifier of a commit node
//! - [`Timestamp`] -- Hybrid clock reading stamped on each commit

pub mod error;
pub mod id;
pub mod temporal;

pub use error::TypeError;
pub use id::{BlobId, CommitId, SHORT_HEX_LEN};
pub use temporal::Timestamp;
