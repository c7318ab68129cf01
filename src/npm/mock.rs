use crate::domain::VersionBump;
use crate::error::{ReleaseError, Result};
use crate::manifest::PackageManifest;
use crate::npm::PackageManager;
use std::cell::RefCell;
use std::path::PathBuf;

/// An npm call recorded by [MockPackageManager]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpmOperation {
    Version(VersionBump),
    RunScript(String),
    Publish,
}

impl NpmOperation {
    /// Short name used to select an operation for failure injection
    pub fn kind(&self) -> &'static str {
        match self {
            NpmOperation::Version(_) => "version",
            NpmOperation::RunScript(_) => "run",
            NpmOperation::Publish => "publish",
        }
    }
}

/// Stand-in for npm that bumps the manifest on disk like `npm version`
/// does and records every call
pub struct MockPackageManager {
    manifest_path: PathBuf,
    fail_on: Option<&'static str>,
    operations: RefCell<Vec<NpmOperation>>,
}

impl MockPackageManager {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        MockPackageManager {
            manifest_path: manifest_path.into(),
            fail_on: None,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Make every operation of this kind (see [NpmOperation::kind]) fail
    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Calls made so far, in order
    pub fn operations(&self) -> Vec<NpmOperation> {
        self.operations.borrow().clone()
    }

    fn record(&self, op: NpmOperation) -> Result<()> {
        if self.fail_on == Some(op.kind()) {
            return Err(ReleaseError::command(format!(
                "simulated npm {} failure",
                op.kind()
            )));
        }
        self.operations.borrow_mut().push(op);
        Ok(())
    }
}

impl PackageManager for MockPackageManager {
    fn bump_version(&self, kind: VersionBump, preid: Option<&str>) -> Result<()> {
        self.record(NpmOperation::Version(kind))?;

        let manifest = PackageManifest::load(&self.manifest_path)?;
        let next = kind.apply(&manifest.semver()?, preid)?;

        // Edit the raw JSON so the rest of the file is left exactly as is.
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&self.manifest_path)?)?;
        value["version"] = serde_json::Value::String(next.to_string());
        let mut text = serde_json::to_string_pretty(&value)?;
        text.push('\n');
        std::fs::write(&self.manifest_path, text)?;
        Ok(())
    }

    fn run_script(&self, script: &str) -> Result<()> {
        self.record(NpmOperation::RunScript(script.to_string()))
    }

    fn publish(&self) -> Result<()> {
        self.record(NpmOperation::Publish)
    }
}
