use std::sync::{Arc, RwLock};

use bytes::Bytes;
use pvc_graph::{Commit, CommitGraph, FileMap};
use pvc_refs::{Branch, BranchStore, InMemoryBranchStore, RefError};
use pvc_store::{BlobStore, InMemoryBlobStore};
use pvc_types::CommitId;
use tracing::{debug, info, warn};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::gc::{self, GcReport};

/// A persistent, in-memory version-control repository.
///
/// All operations take `&self`; a `Repository` can be shared across threads
/// behind an `Arc`. Writers on one branch serialize through a
/// compare-and-swap on the branch head and retry when they lose. Writers on
/// different branches never contend.
pub struct Repository {
    config: RepoConfig,
    store: InMemoryBlobStore,
    graph: CommitGraph,
    branches: InMemoryBranchStore,
    // Writers hold it shared; gc holds it exclusively.
    gc_lock: RwLock<()>,
}

impl Repository {
    /// Create an empty repository with the default configuration.
    pub fn init() -> RepoResult<Self> {
        Self::with_config(RepoConfig::default())
    }

    /// Create an empty repository with one empty branch,
    /// `config.default_branch`, which is current.
    pub fn with_config(config: RepoConfig) -> RepoResult<Self> {
        config.validate()?;
        let store = if config.forbid_empty_content {
            InMemoryBlobStore::forbidding_empty()
        } else {
            InMemoryBlobStore::new()
        };
        let branches = InMemoryBranchStore::new(&config.default_branch)?;
        info!(branch = %config.default_branch, "initialized repository");
        Ok(Self {
            config,
            store,
            graph: CommitGraph::new(),
            branches,
            gc_lock: RwLock::new(()),
        })
    }

    // ---- Writes ----

    /// Record `content` as the new version of `filename` on the current
    /// branch, with the configured default message.
    ///
    /// Fails with `InvalidFileName` for an empty name, and with `Contention`
    /// if the branch head keeps moving for `max_commit_retries` attempts.
    pub fn add_file(&self, filename: &str, content: impl Into<Bytes>) -> RepoResult<Arc<Commit>> {
        let message = self.config.render_message(filename);
        self.commit_file(filename, content, message)
    }

    /// Record `content` as the new version of `filename` on the current
    /// branch.
    ///
    /// The new commit's snapshot is the head's snapshot with `filename`
    /// overridden. If another writer moves the head first, the commit is
    /// rebuilt on the new head, up to `max_commit_retries` times; after that
    /// the call fails with [`RepoError::Contention`] and the branch is left
    /// as the winning writers set it.
    pub fn commit_file(
        &self,
        filename: &str,
        content: impl Into<Bytes>,
        message: impl Into<String>,
    ) -> RepoResult<Arc<Commit>> {
        let branch = self.branches.current_branch()?;
        self.commit_file_on(&branch, filename, content, message)
    }

    /// Like [`commit_file`](Self::commit_file), but on a named branch that
    /// need not be current.
    pub fn commit_file_on(
        &self,
        branch: &str,
        filename: &str,
        content: impl Into<Bytes>,
        message: impl Into<String>,
    ) -> RepoResult<Arc<Commit>> {
        if filename.is_empty() {
            return Err(RepoError::InvalidFileName(filename.to_string()));
        }
        let message = message.into();
        let _writer = self.gc_lock.read().expect("lock poisoned");

        let blob = self.store.put(content.into())?;
        let attempts = self.config.max_commit_retries;

        for attempt in 1..=attempts {
            let head = self.branches.head_of(branch)?;
            let files = match head {
                Some(id) => self.graph.get(&id)?.files().insert(filename, blob),
                None => FileMap::new().insert(filename, blob),
            };
            let commit = self.graph.create(message.clone(), files, head)?;

            match self.branches.compare_and_swap_head(branch, head, commit.id()) {
                Ok(()) => {
                    debug!(
                        branch,
                        commit = %commit.id().short_hex(),
                        file = filename,
                        "committed file"
                    );
                    return Ok(commit);
                }
                Err(RefError::HeadMoved { actual, .. }) => {
                    warn!(
                        branch,
                        attempt,
                        actual = ?actual.map(|id| id.short_hex()),
                        "branch head moved, retrying commit"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RepoError::Contention {
            branch: branch.to_string(),
            attempts,
        })
    }

    // ---- Branches ----

    /// Fork a new branch at the current branch's head.
    ///
    /// The new branch shares the existing history; nothing is copied.
    pub fn create_branch(&self, name: &str) -> RepoResult<Branch> {
        let _writer = self.gc_lock.read().expect("lock poisoned");
        let current = self.branches.current_branch()?;
        let head = self.branches.head_of(&current)?;
        let branch = self.branches.create(name, head)?;
        info!(branch = name, from = %current, "created branch");
        Ok(branch)
    }

    /// Make `name` the current branch.
    pub fn switch_branch(&self, name: &str) -> RepoResult<()> {
        self.branches.set_current_branch(name)?;
        debug!(branch = name, "switched branch");
        Ok(())
    }

    /// Remove a branch other than the current one.
    ///
    /// Commits only it reached stay registered until the next [`gc`](Self::gc).
    pub fn delete_branch(&self, name: &str) -> RepoResult<Branch> {
        let branch = self.branches.delete(name)?;
        info!(branch = name, "deleted branch");
        Ok(branch)
    }

    /// Name of the current branch.
    pub fn current_branch(&self) -> RepoResult<String> {
        Ok(self.branches.current_branch()?)
    }

    /// Look up a branch by name.
    pub fn branch(&self, name: &str) -> RepoResult<Branch> {
        Ok(self.branches.lookup(name)?)
    }

    /// All branches, sorted by name.
    pub fn list_branches(&self) -> RepoResult<Vec<Branch>> {
        Ok(self.branches.list()?)
    }

    // ---- Reads ----

    /// The current branch's head commit, `None` before the first commit.
    pub fn head_commit(&self) -> RepoResult<Option<Arc<Commit>>> {
        let branch = self.branches.current_branch()?;
        self.branches
            .head_of(&branch)?
            .map(|id| self.graph.get(&id).map_err(RepoError::from))
            .transpose()
    }

    /// Content of `filename` as of `commit`, or as of the current head when
    /// `commit` is `None`.
    pub fn get_file_content(&self, filename: &str, commit: Option<CommitId>) -> RepoResult<Bytes> {
        let commit = self.snapshot(commit)?.ok_or(RepoError::NoCommits)?;
        let blob = commit
            .files()
            .get(filename)
            .ok_or_else(|| RepoError::FileNotFound {
                filename: filename.to_string(),
                commit: commit.id(),
            })?;
        Ok(self.store.get(&blob)?)
    }

    /// File names tracked as of `commit` (or the current head), sorted.
    ///
    /// Empty before the first commit.
    pub fn list_files(&self, commit: Option<CommitId>) -> RepoResult<Vec<String>> {
        let Some(commit) = self.snapshot(commit)? else {
            return Ok(Vec::new());
        };
        let names = commit.files().names().into_iter().map(str::to_string).collect();
        Ok(names)
    }

    /// The current branch's history, newest first. Empty before the first
    /// commit.
    pub fn get_history(&self) -> RepoResult<Vec<Arc<Commit>>> {
        Ok(self
            .head_commit()?
            .map(|head| head.ancestors().collect())
            .unwrap_or_default())
    }

    /// Look up a commit by its full id.
    pub fn find_commit(&self, id: &CommitId) -> Option<Arc<Commit>> {
        self.graph.find(id)
    }

    /// Look up a commit by a hex id prefix of at least four characters.
    pub fn resolve_commit(&self, prefix: &str) -> RepoResult<Arc<Commit>> {
        Ok(self.graph.resolve_prefix(prefix)?)
    }

    fn snapshot(&self, commit: Option<CommitId>) -> RepoResult<Option<Arc<Commit>>> {
        match commit {
            Some(id) => self
                .graph
                .find(&id)
                .map(Some)
                .ok_or(RepoError::CommitNotFound(id)),
            None => self.head_commit(),
        }
    }

    // ---- Maintenance ----

    /// Drop every commit no branch reaches and every blob no surviving
    /// commit references.
    ///
    /// Blocks writers for the duration of the pass.
    pub fn gc(&self) -> RepoResult<GcReport> {
        let _exclusive = self.gc_lock.write().expect("lock poisoned");
        let heads = self.branches.heads()?;
        let report = gc::collect(&self.graph, &self.store, &heads);
        info!(
            commits_removed = report.commits_removed,
            commits_retained = report.commits_retained,
            blobs_removed = report.blobs_removed,
            blobs_retained = report.blobs_retained,
            "garbage collection finished"
        );
        Ok(report)
    }

    /// Check the repository's integrity.
    ///
    /// Every commit's id must recompute from its fields, every parent and
    /// branch head must be registered, and every blob a reachable commit
    /// references must be present and hash to its id.
    pub fn verify(&self) -> RepoResult<()> {
        self.graph.validate()?;
        let heads = self.branches.heads()?;
        for head in &heads {
            if !self.graph.contains(head) {
                return Err(RepoError::CommitNotFound(*head));
            }
        }
        let reachable = self.graph.reachable(&heads);
        for id in &reachable {
            let commit = self.graph.get(id)?;
            for blob in commit.files().blob_ids() {
                self.store.verify(&blob)?;
            }
        }
        debug!(commits = reachable.len(), "verified repository");
        Ok(())
    }

    // ---- Accessors ----

    /// The configuration this repository was opened with.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// The content store.
    pub fn store(&self) -> &InMemoryBlobStore {
        &self.store
    }

    /// The commit graph.
    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("branches", &self.branches.len())
            .field("commits", &self.graph.len())
            .field("blobs", &self.store.len())
            .finish()
    }
}
