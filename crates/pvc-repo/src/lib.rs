//! Persistent version control: the repository controller.
//!
//! A [`Repository`] ties together the content store, the immutable commit
//! graph and the branch table. Every write produces a new immutable commit
//! that shares all unchanged state with its parent; every read dereferences
//! immutable nodes and never blocks a writer.
//!
//! ```
//! use pvc_repo::Repository;
//!
//! let repo = Repository::init().unwrap();
//! let first = repo.add_file("README", "hello").unwrap();
//! repo.add_file("README", "hello, world").unwrap();
//!
//! assert_eq!(repo.get_file_content("README", None).unwrap(), "hello, world");
//! assert_eq!(repo.get_file_content("README", Some(first.id())).unwrap(), "hello");
//! assert_eq!(repo.get_history().unwrap().len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod gc;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use gc::GcReport;
pub use repository::Repository;

pub use bytes::Bytes;
pub use pvc_graph::{Commit, FileMap};
pub use pvc_refs::Branch;
pub use pvc_types::{BlobId, CommitId, Timestamp};
