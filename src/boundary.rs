use std::fmt;

/// Non-fatal conditions met while releasing.
/// These are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Releasing from a branch outside the release list because --force was given
    ForcedOffBranch { branch: String, allowed: Vec<String> },
    /// The manifest has no dependency on itself, so nothing to propagate
    NoSelfDependency { name: String, manifest: String },
    /// Nothing will be changed
    DryRun,
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::ForcedOffBranch { branch, allowed } => {
                let branch = if branch.is_empty() {
                    "(detached HEAD)"
                } else {
                    branch.as_str()
                };
                write!(
                    f,
                    "Releasing from '{}' instead of {} because --force was given",
                    branch,
                    allowed.join(" or ")
                )
            }
            BoundaryWarning::NoSelfDependency { name, manifest } => {
                write!(
                    f,
                    "{} has no dependency on '{}'; skipping dependency update",
                    manifest, name
                )
            }
            BoundaryWarning::DryRun => {
                write!(f, "Dry run: no files, commits, tags or packages will be changed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_off_branch_display() {
        let warning = BoundaryWarning::ForcedOffBranch {
            branch: "feature/drag".to_string(),
            allowed: vec!["main".to_string(), "master".to_string()],
        };
        assert_eq!(
            warning.to_string(),
            "Releasing from 'feature/drag' instead of main or master because --force was given"
        );
    }

    #[test]
    fn test_forced_off_detached_head_display() {
        let warning = BoundaryWarning::ForcedOffBranch {
            branch: String::new(),
            allowed: vec!["main".to_string()],
        };
        assert!(warning.to_string().contains("(detached HEAD)"));
    }

    #[test]
    fn test_no_self_dependency_display() {
        let warning = BoundaryWarning::NoSelfDependency {
            name: "vue-grid-kit".to_string(),
            manifest: "packages/grid/package.json".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.starts_with("packages/grid/package.json has no dependency"));
        assert!(msg.contains("'vue-grid-kit'"));
        assert!(msg.contains("skipping"));
    }
}
