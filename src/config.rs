use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Represents the complete configuration for a release run.
///
/// Contains repository, package layout and npm settings. Every section is optional in the
/// file and falls back to the defaults that match a conventional npm project.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub npm: NpmConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_release_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

/// Version control settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_release_branches")]
    pub release_branches: Vec<String>,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            remote: default_remote(),
            release_branches: default_release_branches(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

fn default_manifest() -> String {
    "package.json".to_string()
}

fn default_docs_dir() -> String {
    "docs".to_string()
}

/// Layout of the package inside the repository.
///
/// Both paths are relative to the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackageConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            manifest: default_manifest(),
            docs_dir: default_docs_dir(),
        }
    }
}

fn default_program() -> String {
    "npm".to_string()
}

fn default_build_script() -> String {
    "build:all".to_string()
}

fn default_credential_env() -> Vec<String> {
    vec!["NPM_TOKEN".to_string(), "NODE_AUTH_TOKEN".to_string()]
}

/// npm invocation settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NpmConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_build_script")]
    pub build_script: String,

    /// Prerelease identifier passed as `--preid` to `npm version`
    #[serde(default)]
    pub preid: Option<String>,

    /// Environment variables forwarded to npm for registry authentication
    #[serde(default = "default_credential_env")]
    pub credential_env: Vec<String>,
}

impl Default for NpmConfig {
    fn default() -> Self {
        NpmConfig {
            program: default_program(),
            build_script: default_build_script(),
            preid: None,
            credential_env: default_credential_env(),
        }
    }
}

impl ReleaseConfig {
    /// Checks values serde cannot express as types.
    pub fn validate(&self) -> Result<()> {
        if self.repository.remote.trim().is_empty() {
            return Err(ReleaseError::config("repository.remote must not be empty"));
        }

        if self.repository.release_branches.is_empty() {
            return Err(ReleaseError::config(
                "repository.release_branches must list at least one branch",
            ));
        }

        if self.package.manifest.trim().is_empty() {
            return Err(ReleaseError::config("package.manifest must not be empty"));
        }

        if let Some(preid) = &self.npm.preid {
            let re = Regex::new(r"^[0-9A-Za-z-]+$")
                .map_err(|e| ReleaseError::config(format!("Invalid preid pattern: {}", e)))?;
            if !re.is_match(preid) {
                return Err(ReleaseError::config(format!(
                    "npm.preid '{}' may only contain ASCII alphanumerics and hyphens",
                    preid
                )));
            }
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` at the repository root
/// 3. `.release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&str>, root: &Path) -> Result<ReleaseConfig> {
    let repo_config = root.join("release.toml");
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| ReleaseError::config(format!("Cannot read '{}': {}", path, e)))?
    } else if repo_config.exists() {
        fs::read_to_string(&repo_config)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".release.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(ReleaseConfig::default());
        }
    } else {
        return Ok(ReleaseConfig::default());
    };

    let config: ReleaseConfig =
        toml::from_str(&config_str).map_err(|e| ReleaseError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
