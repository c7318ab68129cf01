/// Represents the checked-out git branch with release context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_release: bool,
}

impl BranchContext {
    /// Create a branch context, marking it as a release branch when its
    /// name is in `release_branches`
    pub fn new(name: impl Into<String>, release_branches: &[String]) -> Self {
        let name_str = name.into();
        let is_release = release_branches.iter().any(|b| *b == name_str);

        BranchContext {
            name: name_str,
            is_release,
        }
    }

    /// Check if releases may be cut from this branch without --force
    pub fn is_release_branch(&self) -> bool {
        self.is_release
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        vec!["main".to_string(), "master".to_string()]
    }

    #[test]
    fn test_main_branch() {
        let branch = BranchContext::new("main", &defaults());
        assert!(branch.is_release);
        assert!(branch.is_release_branch());
    }

    #[test]
    fn test_master_branch() {
        let branch = BranchContext::new("master", &defaults());
        assert!(branch.is_release);
    }

    #[test]
    fn test_develop_branch() {
        let branch = BranchContext::new("develop", &defaults());
        assert!(!branch.is_release_branch());
    }

    #[test]
    fn test_custom_release_branches() {
        let branches = vec!["trunk".to_string()];
        assert!(BranchContext::new("trunk", &branches).is_release_branch());
        assert!(!BranchContext::new("main", &branches).is_release_branch());
    }

    #[test]
    fn test_detached_head_is_not_release() {
        assert!(!BranchContext::new("", &defaults()).is_release_branch());
    }
}
