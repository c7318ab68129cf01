use crate::domain::VersionBump;
use crate::error::{ReleaseError, Result};
use crate::npm::PackageManager;
use crate::release::ReleaseContext;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Runs the real `npm` executable inside the package directory
pub struct NpmCli {
    program: String,
    root: PathBuf,
    credentials: Vec<(String, String)>,
}

impl NpmCli {
    pub fn new(
        program: impl Into<String>,
        root: impl Into<PathBuf>,
        credentials: Vec<(String, String)>,
    ) -> Self {
        NpmCli {
            program: program.into(),
            root: root.into(),
            credentials,
        }
    }

    /// Build from the settings captured at startup. npm runs next to the
    /// configured manifest, which is the file `npm version` rewrites.
    pub fn from_context(ctx: &ReleaseContext) -> Self {
        NpmCli::new(
            ctx.config.npm.program.clone(),
            ctx.package_dir(),
            ctx.credentials.clone(),
        )
    }

    /// Arguments passed to npm for a version bump
    pub fn version_args(kind: VersionBump, preid: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "version".to_string(),
            kind.as_str().to_string(),
            "--no-git-tag-version".to_string(),
        ];
        if let Some(id) = preid {
            args.push("--preid".to_string());
            args.push(id.to_string());
        }
        args
    }

    /// Run npm with inherited stdio, failing on a non-zero exit status.
    fn run(&self, args: &[String]) -> Result<()> {
        let command_line = format!("{} {}", self.program, args.join(" "));
        info!(command = %command_line, cwd = %self.root.display(), "running");

        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.root);
        for (key, value) in &self.credentials {
            cmd.env(key, value);
        }

        let status = cmd
            .status()
            .map_err(|e| ReleaseError::command(format!("Failed to run `{}`: {}", command_line, e)))?;

        if !status.success() {
            return Err(ReleaseError::command(match status.code() {
                Some(code) => format!("`{}` exited with code {}", command_line, code),
                None => format!("`{}` was terminated by a signal", command_line),
            }));
        }

        debug!(command = %command_line, "finished");
        Ok(())
    }
}

impl PackageManager for NpmCli {
    fn bump_version(&self, kind: VersionBump, preid: Option<&str>) -> Result<()> {
        self.run(&Self::version_args(kind, preid))
    }

    fn run_script(&self, script: &str) -> Result<()> {
        self.run(&["run".to_string(), script.to_string()])
    }

    fn publish(&self) -> Result<()> {
        self.run(&["publish".to_string()])
    }
}
