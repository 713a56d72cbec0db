//! O(1) commit lookup by identifier.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use pvc_types::CommitId;

use crate::commit::Commit;

/// Map from [`CommitId`] to the shared commit node.
///
/// The index holds one strong reference per registered commit; a commit
/// removed from the index lives on only as long as some branch chain or
/// caller still holds it.
#[derive(Debug, Default)]
pub struct HashIndex {
    commits: RwLock<HashMap<CommitId, Arc<Commit>>>,
}

impl HashIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commit.
    ///
    /// Idempotent: if a commit with the same id is already registered, the
    /// registered node is returned and `commit` is discarded.
    pub fn insert(&self, commit: Arc<Commit>) -> Arc<Commit> {
        let mut map = self.commits.write().expect("lock poisoned");
        Arc::clone(map.entry(commit.id()).or_insert(commit))
    }

    /// Look up a commit by id.
    pub fn get(&self, id: &CommitId) -> Option<Arc<Commit>> {
        self.commits.read().expect("lock poisoned").get(id).cloned()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &CommitId) -> bool {
        self.commits.read().expect("lock poisoned").contains_key(id)
    }

    /// Number of registered commits.
    pub fn len(&self) -> usize {
        self.commits.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no commits are registered.
    pub fn is_empty(&self) -> bool {
        self.commits.read().expect("lock poisoned").is_empty()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<CommitId> {
        let mut ids: Vec<CommitId> = self
            .commits
            .read()
            .expect("lock poisoned")
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    /// Snapshot of every registered commit.
    pub fn commits(&self) -> Vec<Arc<Commit>> {
        self.commits
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Ids whose hex form starts with `prefix`.
    pub fn matching_prefix(&self, prefix: &str) -> Vec<CommitId> {
        self.commits
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|id| id.to_hex().starts_with(prefix))
            .copied()
            .collect()
    }

    /// Drop every entry not in `keep`. Returns the number removed.
    pub fn retain(&self, keep: &HashSet<CommitId>) -> usize {
        let mut map = self.commits.write().expect("lock poisoned");
        let before = map.len();
        map.retain(|id, _| keep.contains(id));
        before - map.len()
    }
}
