use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;

/// A mutating git call recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Stage(Vec<String>),
    Commit(String),
    Tag(String),
    PushBranch { remote: String, branch: String },
    PushTags { remote: String },
}

impl GitOperation {
    /// Short name used to select an operation for failure injection
    pub fn kind(&self) -> &'static str {
        match self {
            GitOperation::Stage(_) => "stage",
            GitOperation::Commit(_) => "commit",
            GitOperation::Tag(_) => "tag",
            GitOperation::PushBranch { .. } => "push",
            GitOperation::PushTags { .. } => "push-tags",
        }
    }
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    branch: String,
    changes: Vec<String>,
    fail_on: Option<&'static str>,
    operations: RefCell<Vec<GitOperation>>,
}

impl MockRepository {
    /// Create a clean mock checkout of `branch`
    pub fn new(branch: impl Into<String>) -> Self {
        MockRepository {
            branch: branch.into(),
            changes: Vec::new(),
            fail_on: None,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Report these porcelain lines from `status`
    pub fn with_changes(mut self, changes: &[&str]) -> Self {
        self.changes = changes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Make every operation of this kind (see [GitOperation::kind]) fail
    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Mutating operations performed so far, in order
    pub fn operations(&self) -> Vec<GitOperation> {
        self.operations.borrow().clone()
    }

    /// Messages of every commit made so far
    pub fn commits(&self) -> Vec<String> {
        self.operations
            .borrow()
            .iter()
            .filter_map(|op| match op {
                GitOperation::Commit(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of every tag created so far
    pub fn tags(&self) -> Vec<String> {
        self.operations
            .borrow()
            .iter()
            .filter_map(|op| match op {
                GitOperation::Tag(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: GitOperation) -> Result<()> {
        if self.fail_on == Some(op.kind()) {
            return Err(ReleaseError::command(format!(
                "simulated {} failure",
                op.kind()
            )));
        }
        self.operations.borrow_mut().push(op);
        Ok(())
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new("main")
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn status(&self) -> Result<Vec<String>> {
        Ok(self.changes.clone())
    }

    fn stage(&self, paths: &[&str]) -> Result<()> {
        self.record(GitOperation::Stage(
            paths.iter().map(|p| p.to_string()).collect(),
        ))
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.record(GitOperation::Commit(message.to_string()))?;
        Ok(format!("{:040x}", self.operations.borrow().len()))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.record(GitOperation::Tag(name.to_string()))
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(GitOperation::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        })
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        self.record(GitOperation::PushTags {
            remote: remote.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_basic() {
        let repo = MockRepository::new("develop").with_changes(&[" M README.md"]);
        assert_eq!(repo.current_branch().unwrap(), "develop");
        assert_eq!(repo.status().unwrap(), vec![" M README.md".to_string()]);
    }

    #[test]
    fn test_mock_repository_records_in_order() {
        let repo = MockRepository::default();
        repo.stage(&["package.json"]).unwrap();
        repo.commit("release: v1.0.0").unwrap();
        repo.create_tag("v1.0.0").unwrap();

        assert_eq!(repo.commits(), vec!["release: v1.0.0".to_string()]);
        assert_eq!(repo.tags(), vec!["v1.0.0".to_string()]);
        assert_eq!(repo.operations().len(), 3);
    }

    #[test]
    fn test_mock_repository_failure_injection() {
        let repo = MockRepository::default().failing_on("push-tags");
        repo.push_branch("origin", "main").unwrap();
        assert!(repo.push_tags("origin").is_err());
        assert_eq!(repo.operations().len(), 1);
    }
}
