//! The commit graph: allocation, lookup and traversal of commit nodes.
//!
//! [`CommitGraph`] owns the [`HashIndex`] and the clock that stamps new
//! commits. It is a forest of singly-parented chains; branches reference
//! nodes in it but never own it.
//!
//! # Invariants
//!
//! - Every registered commit's parent is registered (until GC prunes both).
//! - A commit's id always recomputes from its fields.
//! - Timestamps handed out by one graph strictly increase.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use pvc_types::{CommitId, Timestamp};

use crate::commit::{Ancestors, Commit, CommitRecord};
use crate::error::{GraphError, GraphResult};
use crate::filemap::FileMap;
use crate::index::HashIndex;

/// Shortest abbreviated id accepted by [`CommitGraph::resolve_prefix`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Immutable commit nodes plus their O(1) index.
#[derive(Debug)]
pub struct CommitGraph {
    index: HashIndex,
    clock: Mutex<Timestamp>,
}

#[derive(Serialize, Deserialize)]
struct GraphSnapshot {
    commits: Vec<CommitRecord>,
}

impl CommitGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            index: HashIndex::new(),
            clock: Mutex::new(Timestamp::zero()),
        }
    }

    /// Number of registered commits.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the graph has no commits.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The underlying hash index.
    pub fn index(&self) -> &HashIndex {
        &self.index
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Allocate a new immutable commit and register it.
    ///
    /// `parent`, when given, must already be registered. The caller is
    /// responsible for every blob in `files` existing in the content store.
    pub fn create(
        &self,
        message: impl Into<String>,
        files: FileMap,
        parent: Option<CommitId>,
    ) -> GraphResult<Arc<Commit>> {
        let parent = parent.map(|id| self.get(&id)).transpose()?;
        let created_at = self.next_timestamp();
        let commit = Arc::new(Commit::new(message.into(), files, parent, created_at));
        debug!(
            commit = %commit.id().short_hex(),
            parent = ?commit.parent_id().map(|p| p.short_hex()),
            files = commit.files().len(),
            "created commit"
        );
        Ok(self.index.insert(commit))
    }

    fn next_timestamp(&self) -> Timestamp {
        let mut clock = self.clock.lock().expect("lock poisoned");
        *clock = clock.tick();
        *clock
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Look up a commit by id. O(1).
    pub fn get(&self, id: &CommitId) -> GraphResult<Arc<Commit>> {
        self.index.get(id).ok_or(GraphError::NotFound(*id))
    }

    /// Look up a commit by id, `None` if unknown.
    pub fn find(&self, id: &CommitId) -> Option<Arc<Commit>> {
        self.index.get(id)
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &CommitId) -> bool {
        self.index.contains(id)
    }

    /// Lazy `commit, parent, …, root` walk.
    pub fn ancestors(&self, commit: &Arc<Commit>) -> Ancestors {
        commit.ancestors()
    }

    /// Resolve an abbreviated hex id to the single matching commit.
    pub fn resolve_prefix(&self, prefix: &str) -> GraphResult<Arc<Commit>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GraphError::InvalidPrefix(prefix));
        }
        if prefix.len() == 64 {
            let id = CommitId::from_hex(&prefix).map_err(|e| GraphError::InvalidPrefix(e.to_string()))?;
            return self.get(&id);
        }
        let matches = self.index.matching_prefix(&prefix);
        match matches.as_slice() {
            [id] => self.get(id),
            [] => Err(GraphError::InvalidPrefix(format!("no commit matches {prefix}"))),
            _ => Err(GraphError::AmbiguousPrefix {
                candidates: matches.len(),
                prefix,
            }),
        }
    }

    // ---------------------------------------------------------------
    // Reachability
    // ---------------------------------------------------------------

    /// Every commit reachable from `heads` through parent links.
    pub fn reachable(&self, heads: &[CommitId]) -> HashSet<CommitId> {
        let mut marked = HashSet::new();
        for head in heads {
            let Some(commit) = self.index.get(head) else {
                continue;
            };
            for ancestor in commit.ancestors() {
                // Everything below an already marked commit is marked too.
                if !marked.insert(ancestor.id()) {
                    break;
                }
            }
        }
        marked
    }

    /// Unregister every commit not reachable from `heads`.
    ///
    /// Returns the number of commits removed. Unreachable nodes are freed
    /// once no caller holds them.
    pub fn retain_reachable(&self, heads: &[CommitId]) -> usize {
        let keep = self.reachable(heads);
        let removed = self.index.retain(&keep);
        debug!(removed, kept = keep.len(), "pruned unreachable commits");
        removed
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Validate the graph's structural integrity.
    ///
    /// Checks that every commit's parent is registered and that every id
    /// recomputes from the commit's fields.
    pub fn validate(&self) -> GraphResult<()> {
        for commit in self.index.commits() {
            let computed = commit.computed_id();
            if computed != commit.id() {
                return Err(GraphError::CorruptCommit {
                    id: commit.id(),
                    computed,
                });
            }
            if let Some(parent) = commit.parent_id() {
                if !self.index.contains(&parent) {
                    return Err(GraphError::DanglingParent {
                        commit: commit.id(),
                        parent,
                    });
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Serialization helpers
    // ---------------------------------------------------------------

    /// Serialize every commit to bincode bytes, parents before children.
    pub fn to_bytes(&self) -> GraphResult<Vec<u8>> {
        let mut commits: Vec<CommitRecord> =
            self.index.commits().iter().map(|c| c.record()).collect();
        commits.sort_by_key(|r| (r.created_at, r.id));
        bincode::serialize(&GraphSnapshot { commits })
            .map_err(|e| GraphError::Serialization(e.to_string()))
    }

    /// Rebuild a graph from [`CommitGraph::to_bytes`] output.
    ///
    /// Every record's id is re-derived and checked, and every parent must
    /// appear before its children.
    pub fn from_bytes(data: &[u8]) -> GraphResult<Self> {
        let snapshot: GraphSnapshot =
            bincode::deserialize(data).map_err(|e| GraphError::Serialization(e.to_string()))?;
        let graph = Self::new();
        let mut latest = Timestamp::zero();
        for record in snapshot.commits {
            let parent = match record.parent {
                Some(parent) => Some(graph.index.get(&parent).ok_or(GraphError::DanglingParent {
                    commit: record.id,
                    parent,
                })?),
                None => None,
            };
            let commit = Commit::new(record.message, record.files, parent, record.created_at);
            if commit.id() != record.id {
                return Err(GraphError::CorruptCommit {
                    id: record.id,
                    computed: commit.id(),
                });
            }
            latest = latest.max(record.created_at);
            graph.index.insert(Arc::new(commit));
        }
        *graph.clock.lock().expect("lock poisoned") = latest;
        debug!(commits = graph.len(), "loaded commit graph");
        Ok(graph)
    }
}

impl Default for CommitGraph {
    fn default() -> Self {
        Self::new()
    }
}
