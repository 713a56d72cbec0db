//! Branch management for the persistent version-control core.
//!
//! Branches are the only mutable state in a repository: named pointers to
//! the commit at the tip of a line of development. Exactly one branch is
//! current at any time.
//!
//! # Architecture
//!
//! - Each branch owns its own lock, so head updates on different branches
//!   never contend.
//! - [`BranchStore::compare_and_swap_head`] rejects an update whose expected
//!   prior head is stale, letting writers detect and retry lost races.
//! - A branch that has a head never goes back to having none.
//!
//! # Modules
//!
//! - [`error`] -- Error types for branch operations
//! - [`types`] -- The [`Branch`] value type
//! - [`traits`] -- The [`BranchStore`] trait defining the storage interface
//! - [`names`] -- Branch name validation
//! - [`memory`] -- In-memory [`InMemoryBranchStore`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryBranchStore;
pub use names::validate_branch_name;
pub use traits::BranchStore;
pub use types::Branch;
