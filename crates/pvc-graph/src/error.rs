//! Error types for the commit graph.

use pvc_types::CommitId;

/// Errors that can occur during commit graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// No commit with this id is registered.
    #[error("commit not found: {0}")]
    NotFound(CommitId),

    /// A commit references a parent that is not registered.
    #[error("dangling parent reference: commit {commit:?} references missing parent {parent:?}")]
    DanglingParent {
        /// The commit holding the bad reference.
        commit: CommitId,
        /// The missing parent.
        parent: CommitId,
    },

    /// An abbreviated id matched more than one commit.
    #[error("ambiguous commit prefix {prefix}: {candidates} matches")]
    AmbiguousPrefix { prefix: String, candidates: usize },

    /// An abbreviated id is too short or not hex.
    #[error("invalid commit prefix: {0}")]
    InvalidPrefix(String),

    /// A commit's fields no longer hash to its id.
    #[error("corrupt commit {id:?}: fields hash to {computed:?}")]
    CorruptCommit { id: CommitId, computed: CommitId },

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
