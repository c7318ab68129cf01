//! Ambient state for a release run, captured once at startup.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ReleaseConfig;

/// Everything the pipeline needs from its environment
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseContext {
    /// Repository root; manifest and docs paths resolve against it
    pub root: PathBuf,
    /// Loaded configuration
    pub config: ReleaseConfig,
    /// Registry credentials forwarded to npm, as (variable, value) pairs
    pub credentials: Vec<(String, String)>,
}

impl ReleaseContext {
    /// Context without any forwarded credentials
    pub fn new(root: impl Into<PathBuf>, config: ReleaseConfig) -> Self {
        ReleaseContext {
            root: root.into(),
            config,
            credentials: Vec::new(),
        }
    }

    /// Context that forwards the credential variables named in the config
    /// which are set in the current process environment
    pub fn from_env(root: impl Into<PathBuf>, config: ReleaseConfig) -> Self {
        let credentials = config
            .npm
            .credential_env
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.clone(), value)))
            .collect::<Vec<_>>();

        debug!(
            forwarded = ?credentials.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            "captured registry credentials"
        );

        ReleaseContext {
            root: root.into(),
            config,
            credentials,
        }
    }

    /// Manifest path relative to the root, as passed to git
    pub fn manifest_relative(&self) -> &str {
        &self.config.package.manifest
    }

    /// Absolute manifest path
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.config.package.manifest)
    }

    /// Directory holding the manifest, where npm is run
    pub fn package_dir(&self) -> PathBuf {
        let manifest = self.manifest_path();
        match manifest.parent() {
            Some(dir) => dir.to_path_buf(),
            None => self.root.clone(),
        }
    }

    /// Docs directory relative to the root, with a trailing slash
    pub fn docs_relative(&self) -> String {
        format!("{}/", self.config.package.docs_dir.trim_end_matches('/'))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tag name for a version, e.g. `v1.2.4`
    pub fn tag_for(&self, version: &str) -> String {
        format!("{}{}", self.config.repository.tag_prefix, version)
    }
}
