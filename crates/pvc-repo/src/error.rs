use pvc_graph::GraphError;
use pvc_refs::RefError;
use pvc_store::StoreError;
use pvc_types::{BlobId, CommitId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("branch already exists: {0}")]
    BranchAlreadyExists(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("no commits yet")]
    NoCommits,

    #[error("file {filename:?} not found in commit {commit}")]
    FileNotFound { filename: String, commit: CommitId },

    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    /// A commit references content the store no longer holds.
    #[error("blob not found: {0}")]
    BlobNotFound(BlobId),

    #[error("invalid branch name {name:?}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("ambiguous commit prefix {prefix}: {candidates} matches")]
    AmbiguousCommit { prefix: String, candidates: usize },

    #[error("invalid commit reference: {0}")]
    InvalidCommitRef(String),

    #[error("branch {branch} kept moving: gave up after {attempts} attempts")]
    Contention { branch: String, attempts: u32 },

    #[error("cannot delete current branch: {0}")]
    DeleteCurrentBranch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("graph error: {0}")]
    Graph(GraphError),

    #[error("ref error: {0}")]
    Ref(RefError),
}

impl RepoError {
    /// Returns `true` for errors that indicate a broken repository rather
    /// than a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::BlobNotFound(_)
                | Self::Graph(_)
                | Self::Store(StoreError::CorruptBlob { .. })
        )
    }
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::BlobNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<GraphError> for RepoError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(id) => Self::CommitNotFound(id),
            GraphError::AmbiguousPrefix { prefix, candidates } => {
                Self::AmbiguousCommit { prefix, candidates }
            }
            GraphError::InvalidPrefix(reason) => Self::InvalidCommitRef(reason),
            other => Self::Graph(other),
        }
    }
}

impl From<RefError> for RepoError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::NotFound { name } => Self::BranchNotFound(name),
            RefError::AlreadyExists { name } => Self::BranchAlreadyExists(name),
            RefError::InvalidBranchName { name, reason } => {
                Self::InvalidBranchName { name, reason }
            }
            RefError::DeleteCurrentBranch { name } => Self::DeleteCurrentBranch(name),
            other => Self::Ref(other),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_errors_map_to_named_variants() {
        let blob = BlobId::from_hash([1; 32]);
        let commit = CommitId::from_hash([2; 32]);
        assert!(matches!(RepoError::from(StoreError::NotFound(blob)), RepoError::BlobNotFound(id) if id == blob));
        assert!(matches!(RepoError::from(GraphError::NotFound(commit)), RepoError::CommitNotFound(id) if id == commit));
        assert!(matches!(
            RepoError::from(RefError::NotFound { name: "x".into() }),
            RepoError::BranchNotFound(name) if name == "x"
        ));
        assert!(matches!(
            RepoError::from(RefError::AlreadyExists { name: "x".into() }),
            RepoError::BranchAlreadyExists(_)
        ));
    }

    #[test]
    fn internal_classification() {
        assert!(RepoError::BlobNotFound(BlobId::from_hash([0; 32])).is_internal());
        assert!(!RepoError::NoCommits.is_internal());
        assert!(!RepoError::Store(StoreError::EmptyContent).is_internal());
        assert!(!RepoError::BranchNotFound("x".into()).is_internal());
    }
}
