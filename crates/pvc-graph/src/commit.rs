//! The immutable commit node.
//!
//! A [`Commit`] snapshots the complete set of tracked files and holds a
//! shared reference to its parent. Nodes never change after construction,
//! so any number of branches and threads can hold and walk them without
//! synchronization.

use std::fmt;
use std::sync::Arc;

use pvc_crypto::ContentHasher;
use pvc_types::{CommitId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::filemap::FileMap;

/// An immutable snapshot node in the commit graph.
pub struct Commit {
    id: CommitId,
    message: String,
    files: FileMap,
    parent: Option<Arc<Commit>>,
    created_at: Timestamp,
}

impl Commit {
    /// Build a commit, deriving its id from all of its fields.
    pub(crate) fn new(
        message: String,
        files: FileMap,
        parent: Option<Arc<Commit>>,
        created_at: Timestamp,
    ) -> Self {
        let id = Self::derive_id(
            &message,
            &files,
            parent.as_ref().map(|p| p.id),
            created_at,
        );
        Self {
            id,
            message,
            files,
            parent,
            created_at,
        }
    }

    /// Derive a commit id.
    ///
    /// The id covers the parent id, the file snapshot's digest and size, the
    /// timestamp, and the message. Two commits that differ in any of these,
    /// including only in file content, get different ids.
    pub fn derive_id(
        message: &str,
        files: &FileMap,
        parent: Option<CommitId>,
        created_at: Timestamp,
    ) -> CommitId {
        let mut hasher = ContentHasher::COMMIT.start();
        match parent {
            Some(parent) => ContentHasher::update_field(&mut hasher, parent.as_bytes()),
            None => ContentHasher::update_field(&mut hasher, &[]),
        }
        hasher.update(&files.digest().to_bytes());
        hasher.update(&(files.len() as u64).to_le_bytes());
        hasher.update(&created_at.to_le_bytes());
        ContentHasher::update_field(&mut hasher, message.as_bytes());
        ContentHasher::commit_id(&hasher)
    }

    /// This commit's identifier.
    pub fn id(&self) -> CommitId {
        self.id
    }

    /// Free-form commit message (may be empty).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Complete file snapshot as of this commit.
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// The parent commit, `None` for a root.
    pub fn parent(&self) -> Option<&Arc<Commit>> {
        self.parent.as_ref()
    }

    /// The parent's id, `None` for a root.
    pub fn parent_id(&self) -> Option<CommitId> {
        self.parent.as_ref().map(|p| p.id)
    }

    /// When the commit was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns `true` if this commit has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Walk `self, parent, grandparent, …` down to the root.
    pub fn ancestors(self: &Arc<Self>) -> Ancestors {
        Ancestors {
            next: Some(Arc::clone(self)),
        }
    }

    /// Recompute the id from the stored fields.
    pub fn computed_id(&self) -> CommitId {
        Self::derive_id(&self.message, &self.files, self.parent_id(), self.created_at)
    }

    /// Flat, serializable form with the parent reduced to its id.
    pub fn record(&self) -> CommitRecord {
        CommitRecord {
            id: self.id,
            message: self.message.clone(),
            files: self.files.clone(),
            parent: self.parent_id(),
            created_at: self.created_at,
        }
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} {} ({} files)",
            self.id.short_hex(),
            self.message,
            self.files.len()
        )
    }
}

impl Drop for Commit {
    // Unlink uniquely owned ancestors iteratively; the default recursive drop
    // would overflow the stack on long histories.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(commit) = next {
            match Arc::try_unwrap(commit) {
                Ok(mut owned) => next = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &self.id)
            .field("message", &self.message)
            .field("files", &self.files.len())
            .field("parent", &self.parent_id())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Serializable form of a [`Commit`]: one record per commit, parent by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: CommitId,
    pub message: String,
    pub files: FileMap,
    pub parent: Option<CommitId>,
    pub created_at: Timestamp,
}

/// Lazy iterator over a commit and its ancestors, newest first.
///
/// Follows `Arc` parent links only, so it never takes a lock and can be
/// cloned or restarted from the same commit any number of times.
#[derive(Clone)]
pub struct Ancestors {
    next: Option<Arc<Commit>>,
}

impl Iterator for Ancestors {
    type Item = Arc<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent.clone();
        Some(current)
    }
}

impl std::iter::FusedIterator for Ancestors {}
