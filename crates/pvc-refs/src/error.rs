//! Error types for branch operations.

use pvc_types::CommitId;
use thiserror::Error;

/// Errors that can occur during branch operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The branch was not found.
    #[error("branch not found: {name}")]
    NotFound { name: String },

    /// A branch with this name already exists.
    #[error("branch already exists: {name}")]
    AlreadyExists { name: String },

    /// The branch name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// A compare-and-swap found a different head than the caller expected.
    #[error("head of {branch} moved: expected {expected:?}, found {actual:?}")]
    HeadMoved {
        branch: String,
        expected: Option<CommitId>,
        actual: Option<CommitId>,
    },

    /// Cannot delete the current branch.
    #[error("cannot delete current branch: {name}")]
    DeleteCurrentBranch { name: String },
}

/// Convenience type alias for branch operations.
pub type Result<T> = std::result::Result<T, RefError>;
