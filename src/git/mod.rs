//! Git operations abstraction layer
//!
//! The release pipeline talks to version control only through the
//! [Repository] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: the real thing, backed by the `git2` crate
//! - [mock::MockRepository]: an in-memory recorder for tests
//!
//! ```rust
//! # use npm_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> npm_release::Result<()> {
//! let branch = repo.current_branch()?;
//! if repo.status()?.is_empty() {
//!     println!("{} is clean", branch);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitOperation, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;

/// Version control operations needed to cut a release
///
/// All methods return [crate::error::Result<T>]; implementations map
/// backend errors (like `git2::Error`) into [crate::error::ReleaseError].
pub trait Repository {
    /// Name of the checked-out branch
    ///
    /// Returns an empty string on a detached HEAD, like
    /// `git branch --show-current`.
    fn current_branch(&self) -> Result<String>;

    /// Pending changes in the working tree and index
    ///
    /// Each entry is formatted like a `git status --porcelain` line
    /// (`"XY path"`). Untracked files are included, ignored files are not.
    /// An empty list means the tree is clean.
    fn status(&self) -> Result<Vec<String>>;

    /// Stage files or whole directories, relative to the repository root
    ///
    /// Directories are staged recursively, including deletions.
    fn stage(&self, paths: &[&str]) -> Result<()>;

    /// Commit the index on top of HEAD
    ///
    /// # Returns
    /// * `Ok(String)` - Hash of the new commit
    /// * `Err` - If the index matches HEAD (nothing to commit) or on git error
    fn commit(&self, message: &str) -> Result<String>;

    /// Create a lightweight tag at HEAD
    ///
    /// Fails if the tag already exists.
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push a local branch to the branch of the same name on `remote`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push every local tag to `remote`
    fn push_tags(&self, remote: &str) -> Result<()>;
}
