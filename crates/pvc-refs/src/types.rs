//! Branch value type.

use pvc_types::CommitId;
use serde::{Deserialize, Serialize};

/// A named pointer to a commit.
///
/// Branch identity is the name. Two branches may point at the same commit,
/// which is exactly the state right after a fork.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name (e.g. "main", "feature/auth").
    pub name: String,
    /// The commit this branch points at, `None` before its first commit.
    pub head: Option<CommitId>,
}

impl Branch {
    /// Create a branch value.
    pub fn new(name: impl Into<String>, head: Option<CommitId>) -> Self {
        Self {
            name: name.into(),
            head,
        }
    }

    /// Returns `true` if the branch has no commits yet.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_branch_without_head_is_empty() {
        assert!(Branch::new("main", None).is_empty());
        assert!(!Branch::new("main", Some(CommitId::from_hash([1; 32]))).is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let branch = Branch::new("feature/x", Some(CommitId::from_hash([4; 32])));
        let json = serde_json::to_string(&branch).unwrap();
        let parsed: Branch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, branch);
    }
}
