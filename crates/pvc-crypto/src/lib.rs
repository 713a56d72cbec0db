//! Hashing primitives for the persistent version-control core.
//!
//! Provides domain-separated BLAKE3 hashing for blobs, commits and file-map
//! entries, and an order-independent incremental digest for sets of
//! entries.
//!
//! Every digest is computed with `blake3`; the set digest only adds digests
//! together.

pub mod hasher;
pub mod set_digest;

pub use hasher::ContentHasher;
pub use set_digest::SetDigest;
