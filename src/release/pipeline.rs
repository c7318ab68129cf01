//! Release workflow orchestration
//!
//! Validates the checkout, then runs the release steps strictly in order.
//! The first failure ends the run; nothing already done is rolled back. In
//! particular a failure between the release commit and the push leaves the
//! local branch and tag ahead of the remote, for the operator to push or
//! reset by hand.

use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::domain::{BranchContext, RepositoryState, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::manifest::PackageManifest;
use crate::npm::{NpmCli, PackageManager};
use crate::release::{ReleaseContext, ReleaseStep};
use crate::ui;

/// Arguments for the release workflow
///
/// Mirrors the CLI flags without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseArgs {
    /// One of the [VersionBump] names; validated before anything runs
    pub version_type: String,

    /// Allow releasing from a branch outside the release list
    pub force: bool,

    /// Validate and print the plan without changing anything
    pub dry_run: bool,
}

impl Default for ReleaseArgs {
    fn default() -> Self {
        ReleaseArgs {
            version_type: VersionBump::Patch.to_string(),
            force: false,
            dry_run: false,
        }
    }
}

/// Result of a successful release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// The released version, as read back from the manifest
    pub version: String,

    /// The tag that was created
    pub tag: String,

    /// Whether the self-dependency entry was rewritten and pushed
    pub dependency_updated: bool,

    /// True when nothing was executed
    pub dry_run: bool,
}

/// Validate the bump kind, the branch and the working tree, in that order.
///
/// Reads repository state once and mutates nothing.
pub fn check_preconditions<R: Repository>(
    args: &ReleaseArgs,
    ctx: &ReleaseContext,
    repo: &R,
) -> Result<(VersionBump, RepositoryState)> {
    let kind: VersionBump = args.version_type.parse()?;

    let branch_name = repo
        .current_branch()
        .map_err(|e| ReleaseError::step("Failed to read current git branch", e))?;
    let branch = BranchContext::new(branch_name, &ctx.config.repository.release_branches);

    if !branch.is_release_branch() {
        if !args.force {
            return Err(ReleaseError::UnsafeBranch {
                branch: branch.name,
                allowed: ctx.config.repository.release_branches.clone(),
            });
        }
        ui::display_boundary_warning(&BoundaryWarning::ForcedOffBranch {
            branch: branch.name.clone(),
            allowed: ctx.config.repository.release_branches.clone(),
        });
    }

    let changes = repo
        .status()
        .map_err(|e| ReleaseError::step("Failed to check git status", e))?;
    let state = RepositoryState::new(branch, changes);

    if !state.is_clean() {
        return Err(ReleaseError::DirtyWorkingTree {
            paths: state.changes,
        });
    }

    Ok((kind, state))
}

/// Main release workflow
///
/// 1. Check preconditions
/// 2. Bump the version with npm (no git tag)
/// 3. Re-read the manifest for the authoritative version
/// 4. Build
/// 5. Commit the manifest and docs, then tag
/// 6. Push commits, then tags
/// 7. Publish to npm
/// 8. Propagate the version into the package's dependency on itself, if any
///
/// # Returns
///
/// The released version and tag, or the first error encountered
pub fn run_release<R: Repository, P: PackageManager>(
    args: &ReleaseArgs,
    ctx: &ReleaseContext,
    repo: &R,
    npm: &P,
) -> Result<ReleaseOutcome> {
    let (kind, state) = check_preconditions(args, ctx, repo)?;
    let preid = ctx.config.npm.preid.as_deref();

    if args.dry_run {
        return plan_release(kind, preid, ctx);
    }

    let remote = ctx.config.repository.remote.as_str();
    let manifest_file = ctx.manifest_relative();
    info!(kind = %kind, branch = %state.branch.name, "starting release");
    ui::display_status(&format!(
        "Releasing {} from {} to {}",
        kind,
        ctx.root().display(),
        remote
    ));

    ui::display_phase(&format!("Bumping {} version...", kind));
    ReleaseStep::new(version_command(ctx, kind, preid), "Version bump failed")
        .run(|| npm.bump_version(kind, preid))?;

    let mut manifest =
        ReleaseStep::new(format!("read {}", manifest_file), "Reading manifest failed")
            .quiet()
            .run(|| PackageManifest::load(ctx.manifest_path()))?;
    let version = manifest.version().to_string();
    let tag = ctx.tag_for(&version);
    ui::display_success(&format!("Version updated to {}", version));

    ui::display_phase("Building...");
    let program = ctx.config.npm.program.as_str();
    let script = ctx.config.npm.build_script.as_str();
    ReleaseStep::new(format!("{} run {}", program, script), "Build failed")
        .run(|| npm.run_script(script))?;

    ui::display_phase("Committing release...");
    let docs = ctx.docs_relative();
    ReleaseStep::new(format!("git add {}", manifest_file), "Staging manifest failed")
        .run(|| repo.stage(&[manifest_file]))?;
    ReleaseStep::new(format!("git add {}", docs), "Staging docs failed")
        .run(|| repo.stage(&[docs.as_str()]))?;
    let message = format!("release: v{}", version);
    ReleaseStep::new(format!("git commit -m \"{}\"", message), "Commit failed")
        .run(|| repo.commit(&message))?;

    ui::display_phase("Tagging...");
    ReleaseStep::new(format!("git tag {}", tag), "Tagging failed")
        .run(|| repo.create_tag(&tag))?;

    ui::display_phase("Pushing commits and tags...");
    push_current_branch(repo, remote, &state.branch.name, "Pushing commits failed")?;
    ReleaseStep::new(format!("git push {} --tags", remote), "Pushing tags failed")
        .run(|| repo.push_tags(remote))?;

    ui::display_phase("Publishing to npm...");
    ReleaseStep::new(format!("{} publish", program), "Publishing failed")
        .run(|| npm.publish())?;

    ui::display_phase("Updating self-dependency...");
    let name = manifest.name().to_string();
    let dependency_updated = if manifest.update_self_dependency(&version) {
        ReleaseStep::new(format!("write {}", manifest_file), "Writing manifest failed")
            .quiet()
            .run(|| manifest.save())?;
        ui::display_success(&format!("Dependency {} set to ^{}", name, version));

        ReleaseStep::new(
            format!("git add {}", manifest_file),
            "Staging dependency update failed",
        )
        .run(|| repo.stage(&[manifest_file]))?;
        let message = format!("chore: update {} to v{}", name, version);
        ReleaseStep::new(
            format!("git commit -m \"{}\"", message),
            "Committing dependency update failed",
        )
        .run(|| repo.commit(&message))?;
        push_current_branch(
            repo,
            remote,
            &state.branch.name,
            "Pushing dependency update failed",
        )?;
        true
    } else {
        ui::display_boundary_warning(&BoundaryWarning::NoSelfDependency {
            name,
            manifest: ctx.manifest_relative().to_string(),
        });
        false
    };

    ui::display_release_summary(&tag, dependency_updated);
    info!(version = %version, tag = %tag, dependency_updated, "release complete");

    Ok(ReleaseOutcome {
        version,
        tag,
        dependency_updated,
        dry_run: false,
    })
}

fn push_current_branch<R: Repository>(
    repo: &R,
    remote: &str,
    branch: &str,
    failure: &str,
) -> Result<()> {
    ReleaseStep::new(format!("git push {} {}", remote, branch), failure).run(|| {
        if branch.is_empty() {
            return Err(ReleaseError::command("HEAD is detached; there is no branch to push"));
        }
        repo.push_branch(remote, branch)
    })
}

/// Predict the release and list its steps without running any of them
fn plan_release(
    kind: VersionBump,
    preid: Option<&str>,
    ctx: &ReleaseContext,
) -> Result<ReleaseOutcome> {
    ui::display_boundary_warning(&BoundaryWarning::DryRun);

    let manifest = PackageManifest::load(ctx.manifest_path())?;
    let version = kind.apply(&manifest.semver()?, preid)?.to_string();
    let tag = ctx.tag_for(&version);
    let remote = &ctx.config.repository.remote;
    let manifest_file = ctx.manifest_relative();

    let mut steps = vec![
        version_command(ctx, kind, preid),
        format!("{} run {}", ctx.config.npm.program, ctx.config.npm.build_script),
        format!("git add {} {}", manifest_file, ctx.docs_relative()),
        format!("git commit -m \"release: v{}\"", version),
        format!("git tag {}", tag),
        format!("git push {}", remote),
        format!("git push {} --tags", remote),
        format!("{} publish", ctx.config.npm.program),
    ];

    if manifest.self_dependency().is_some() {
        steps.push(format!(
            "set dependencies[\"{}\"] to ^{} and commit \"chore: update {} to v{}\"",
            manifest.name(),
            version,
            manifest.name(),
            version
        ));
        steps.push(format!("git push {}", remote));
    }

    ui::display_plan(&tag, &steps);

    Ok(ReleaseOutcome {
        version,
        tag,
        dependency_updated: false,
        dry_run: true,
    })
}

fn version_command(ctx: &ReleaseContext, kind: VersionBump, preid: Option<&str>) -> String {
    format!(
        "{} {}",
        ctx.config.npm.program,
        NpmCli::version_args(kind, preid).join(" ")
    )
}
