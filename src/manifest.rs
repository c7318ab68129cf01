//! `package.json` access.
//!
//! The manifest is kept as an ordered JSON object so that fields this crate
//! does not know about survive a rewrite untouched and in their original
//! order.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ReleaseError, Result};

/// In-memory copy of a package manifest
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl PackageManifest {
    /// Read and parse the manifest at `path`.
    ///
    /// Fails if the file is not a JSON object or lacks a string `name` or
    /// `version`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReleaseError::manifest(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded manifest");
        Self::parse(path, &content)
    }

    /// Parse manifest text that belongs at `path`
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let fields = match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => map,
            _ => {
                return Err(ReleaseError::manifest(format!(
                    "{} is not a JSON object",
                    path.display()
                )))
            }
        };

        let manifest = PackageManifest { path, fields };
        manifest.require_str("name")?;
        manifest.require_str("version")?;
        Ok(manifest)
    }

    fn require_str(&self, key: &str) -> Result<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ReleaseError::manifest(format!(
                    "{} has no string \"{}\" field",
                    self.path.display(),
                    key
                ))
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.fields
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Parse the `version` field as semver
    pub fn semver(&self) -> Result<semver::Version> {
        semver::Version::parse(self.version()).map_err(|e| {
            ReleaseError::manifest(format!("Invalid version '{}': {}", self.version(), e))
        })
    }

    /// Range recorded under `dependencies[name]`, if any
    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.fields
            .get("dependencies")
            .and_then(Value::as_object)
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Range the package declares on itself
    pub fn self_dependency(&self) -> Option<&str> {
        self.dependency(self.name())
    }

    /// Point the package's own dependency entry at `^version`.
    ///
    /// Returns false and leaves the manifest unchanged when there is no such
    /// entry.
    pub fn update_self_dependency(&mut self, version: &str) -> bool {
        if self.self_dependency().is_none() {
            return false;
        }

        let name = self.name().to_string();
        if let Some(Value::Object(deps)) = self.fields.get_mut("dependencies") {
            deps.insert(name, Value::String(format!("^{}", version)));
            return true;
        }
        false
    }

    /// Manifest text as npm writes it: two-space indent, trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.fields)?;
        out.push('\n');
        Ok(out)
    }

    /// Write the manifest back to the path it was loaded from
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_json_string()?)?;
        debug!(path = %self.path.display(), "wrote manifest");
        Ok(())
    }
}
