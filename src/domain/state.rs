use super::branch::BranchContext;

/// Snapshot of the local checkout taken before the release starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    pub branch: BranchContext,
    /// Pending changes in `git status --porcelain` form ("XY path")
    pub changes: Vec<String>,
}

impl RepositoryState {
    pub fn new(branch: BranchContext, changes: Vec<String>) -> Self {
        RepositoryState { branch, changes }
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }
}
