//! Immutable commit graph for the persistent version-control core.
//!
//! Commits are immutable snapshot nodes linked to their parent through shared
//! `Arc` back-references, so forking a branch never copies history. Every
//! commit is registered in a per-graph [`HashIndex`] for O(1) lookup by id.
//!
//! # Modules
//!
//! - [`filemap`] -- persistent filename → blob trie ([`FileMap`])
//! - [`commit`] -- the [`Commit`] node and its [`Ancestors`] iterator
//! - [`index`] -- [`HashIndex`], `CommitId` → `Arc<Commit>`
//! - [`graph`] -- [`CommitGraph`], the allocator and query surface

pub mod commit;
pub mod error;
pub mod filemap;
pub mod graph;
pub mod index;

pub use commit::{Ancestors, Commit, CommitRecord};
pub use error::{GraphError, GraphResult};
pub use filemap::FileMap;
pub use graph::CommitGraph;
pub use index::HashIndex;
