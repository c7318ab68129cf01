use thiserror::Error;

/// Unified error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Refusing to release from branch '{branch}' (expected one of: {}); pass --force to override", .allowed.join(", "))]
    UnsafeBranch {
        branch: String,
        allowed: Vec<String>,
    },

    #[error("Working tree is not clean; commit or stash these changes first:\n{}", format_paths(.paths))]
    DirtyWorkingTree { paths: Vec<String> },

    #[error("{step}: {message}")]
    StepFailure { step: String, message: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in npm-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

fn format_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ReleaseError {
    /// Create an invalid argument error with context
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidArgument(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create an external command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        ReleaseError::Command(msg.into())
    }

    /// Wrap any error as the failure of a named pipeline step
    pub fn step(step: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ReleaseError::StepFailure {
            step: step.into(),
            message: source.to_string(),
        }
    }
}
