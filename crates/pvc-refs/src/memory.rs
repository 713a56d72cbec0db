//! In-memory branch table.
//!
//! [`InMemoryBranchStore`] keeps each branch in its own slot with a private
//! mutex. The table lock is held only long enough to find or insert a slot,
//! so head updates on different branches proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use pvc_types::CommitId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;
use crate::traits::BranchStore;
use crate::types::Branch;

#[derive(Debug)]
struct BranchSlot {
    head: Mutex<Option<CommitId>>,
}

impl BranchSlot {
    fn new(head: Option<CommitId>) -> Arc<Self> {
        Arc::new(Self {
            head: Mutex::new(head),
        })
    }

    fn head(&self) -> Option<CommitId> {
        *self.head.lock().expect("lock poisoned")
    }
}

/// An in-memory implementation of [`BranchStore`].
///
/// Lock order is `current` before `branches`; only deletion and switching
/// take both.
#[derive(Debug)]
pub struct InMemoryBranchStore {
    branches: RwLock<HashMap<String, Arc<BranchSlot>>>,
    current: RwLock<String>,
}

impl InMemoryBranchStore {
    /// Create a table holding one empty branch, which becomes current.
    pub fn new(default_branch: &str) -> Result<Self> {
        validate_branch_name(default_branch)?;
        let mut branches = HashMap::new();
        branches.insert(default_branch.to_string(), BranchSlot::new(None));
        Ok(Self {
            branches: RwLock::new(branches),
            current: RwLock::new(default_branch.to_string()),
        })
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.branches.read().expect("lock poisoned").len()
    }

    /// Always `false`: the current branch always exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, name: &str) -> Result<Arc<BranchSlot>> {
        self.branches
            .read()
            .expect("lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| RefError::NotFound {
                name: name.to_string(),
            })
    }
}

impl BranchStore for InMemoryBranchStore {
    fn create(&self, name: &str, initial_head: Option<CommitId>) -> Result<Branch> {
        validate_branch_name(name)?;
        let mut branches = self.branches.write().expect("lock poisoned");
        if branches.contains_key(name) {
            return Err(RefError::AlreadyExists {
                name: name.to_string(),
            });
        }
        branches.insert(name.to_string(), BranchSlot::new(initial_head));
        debug!(branch = name, head = ?initial_head, "created branch");
        Ok(Branch::new(name, initial_head))
    }

    fn lookup(&self, name: &str) -> Result<Branch> {
        let slot = self.slot(name)?;
        Ok(Branch::new(name, slot.head()))
    }

    fn update_head(&self, name: &str, new_head: CommitId) -> Result<Option<CommitId>> {
        let slot = self.slot(name)?;
        let mut head = slot.head.lock().expect("lock poisoned");
        let previous = head.replace(new_head);
        debug!(branch = name, head = %new_head.short_hex(), "moved branch head");
        Ok(previous)
    }

    fn compare_and_swap_head(
        &self,
        name: &str,
        expected: Option<CommitId>,
        new_head: CommitId,
    ) -> Result<()> {
        let slot = self.slot(name)?;
        let mut head = slot.head.lock().expect("lock poisoned");
        if *head != expected {
            return Err(RefError::HeadMoved {
                branch: name.to_string(),
                expected,
                actual: *head,
            });
        }
        *head = Some(new_head);
        debug!(branch = name, head = %new_head.short_hex(), "advanced branch head");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<Branch> {
        let current = self.current.read().expect("lock poisoned");
        if *current == name {
            return Err(RefError::DeleteCurrentBranch {
                name: name.to_string(),
            });
        }
        let slot = self
            .branches
            .write()
            .expect("lock poisoned")
            .remove(name)
            .ok_or_else(|| RefError::NotFound {
                name: name.to_string(),
            })?;
        debug!(branch = name, "deleted branch");
        Ok(Branch::new(name, slot.head()))
    }

    fn list(&self) -> Result<Vec<Branch>> {
        let branches = self.branches.read().expect("lock poisoned");
        let mut result: Vec<Branch> = branches
            .iter()
            .map(|(name, slot)| Branch::new(name.clone(), slot.head()))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.current.read().expect("lock poisoned").clone())
    }

    fn set_current_branch(&self, name: &str) -> Result<()> {
        let mut current = self.current.write().expect("lock poisoned");
        if !self.branches.read().expect("lock poisoned").contains_key(name) {
            return Err(RefError::NotFound {
                name: name.to_string(),
            });
        }
        *current = name.to_string();
        debug!(branch = name, "switched current branch");
        Ok(())
    }
}
