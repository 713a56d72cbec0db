//! Content-addressed blob storage.
//!
//! Every file version tracked by a repository is stored here as an immutable
//! [`Blob`] identified by the BLAKE3 digest of its bytes. Identical content
//! is stored exactly once, no matter how many files, commits or branches
//! refer to it.
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. `put` of identical content from any number of threads yields one id and
//!    one physical copy.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets blob contents.

pub mod blob;
pub mod error;
pub mod memory;
pub mod traits;

pub use blob::Blob;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
