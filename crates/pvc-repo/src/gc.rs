//! Reachability-based garbage collection.
//!
//! A commit is live if some branch head reaches it through parent links; a
//! blob is live if some live commit's file map references it. Everything
//! else is unregistered. Commits a caller still holds stay valid as values,
//! but blobs only they reference are gone.

use std::collections::HashSet;

use pvc_graph::CommitGraph;
use pvc_store::BlobStore;
use pvc_types::{BlobId, CommitId};
use serde::Serialize;

/// Outcome of one collection pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub commits_removed: usize,
    pub commits_retained: usize,
    pub blobs_removed: usize,
    pub blobs_retained: usize,
}

impl GcReport {
    /// Returns `true` if the pass reclaimed nothing.
    pub fn is_noop(&self) -> bool {
        self.commits_removed == 0 && self.blobs_removed == 0
    }
}

/// Sweep everything not reachable from `heads`.
///
/// The caller must keep writers out for the duration; a blob stored by an
/// in-flight write is not yet referenced by any commit.
pub(crate) fn collect(graph: &CommitGraph, store: &dyn BlobStore, heads: &[CommitId]) -> GcReport {
    let commits_removed = graph.retain_reachable(heads);
    let live: HashSet<BlobId> = graph
        .index()
        .commits()
        .iter()
        .flat_map(|commit| commit.files().blob_ids())
        .collect();
    let blobs_removed = store.retain(&|id| live.contains(id));
    GcReport {
        commits_removed,
        commits_retained: graph.len(),
        blobs_removed,
        blobs_retained: live.len(),
    }
}
