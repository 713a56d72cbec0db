//! The [`BranchStore`] trait defining the branch table interface.

use pvc_types::CommitId;

use crate::error::Result;
use crate::types::Branch;

/// Storage backend for the branch table.
///
/// Implementations must be thread-safe (`Send + Sync`). Head updates on the
/// same branch are atomic with respect to each other; updates on different
/// branches must not contend. The current branch always names an existing
/// branch.
pub trait BranchStore: Send + Sync {
    /// Register a new branch. Fails with `AlreadyExists` if the name is
    /// taken and `InvalidBranchName` if it fails validation.
    fn create(&self, name: &str, initial_head: Option<CommitId>) -> Result<Branch>;

    /// Read a branch. Fails with `NotFound` if absent.
    fn lookup(&self, name: &str) -> Result<Branch>;

    /// Replace a branch's head unconditionally, returning the previous head.
    fn update_head(&self, name: &str, new_head: CommitId) -> Result<Option<CommitId>>;

    /// Replace a branch's head only if it still equals `expected`.
    ///
    /// Fails with `HeadMoved` (carrying the actual head) when another writer
    /// got there first.
    fn compare_and_swap_head(
        &self,
        name: &str,
        expected: Option<CommitId>,
        new_head: CommitId,
    ) -> Result<()>;

    /// Remove a branch. Fails with `DeleteCurrentBranch` for the current
    /// branch and `NotFound` if absent.
    fn delete(&self, name: &str) -> Result<Branch>;

    /// All branches, sorted by name.
    fn list(&self) -> Result<Vec<Branch>>;

    /// Name of the current branch.
    fn current_branch(&self) -> Result<String>;

    /// Make `name` the current branch. Fails with `NotFound` if absent.
    fn set_current_branch(&self, name: &str) -> Result<()>;

    /// Head of a single branch.
    fn head_of(&self, name: &str) -> Result<Option<CommitId>> {
        Ok(self.lookup(name)?.head)
    }

    /// Heads of every branch that has one.
    fn heads(&self) -> Result<Vec<CommitId>> {
        Ok(self.list()?.into_iter().filter_map(|b| b.head).collect())
    }
}
