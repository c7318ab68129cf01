//! Package manager abstraction
//!
//! Building and publishing are delegated to npm. The pipeline only sees the
//! [PackageManager] trait so it can run against [mock::MockPackageManager]
//! in tests.

pub mod cli;
pub mod mock;

pub use cli::NpmCli;
pub use mock::{MockPackageManager, NpmOperation};

use crate::domain::VersionBump;
use crate::error::Result;

/// npm operations needed to cut a release
pub trait PackageManager {
    /// Rewrite the manifest version (`npm version <kind> --no-git-tag-version`)
    ///
    /// Must not create a commit or tag.
    fn bump_version(&self, kind: VersionBump, preid: Option<&str>) -> Result<()>;

    /// Run a package script (`npm run <script>`)
    fn run_script(&self, script: &str) -> Result<()>;

    /// Publish the package to the registry (`npm publish`)
    fn publish(&self) -> Result<()>;
}
