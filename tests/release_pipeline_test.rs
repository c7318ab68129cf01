// tests/release_pipeline_test.rs
use npm_release::config::ReleaseConfig;
use npm_release::domain::VersionBump;
use npm_release::git::{GitOperation, MockRepository};
use npm_release::manifest::PackageManifest;
use npm_release::npm::{MockPackageManager, NpmOperation};
use npm_release::release::{run_release, ReleaseArgs, ReleaseContext};
use npm_release::ReleaseError;
use std::fs;
use tempfile::TempDir;

const PLAIN_MANIFEST: &str = r#"{
  "name": "vue-grid-kit",
  "version": "1.2.3",
  "dependencies": {
    "vue": "^3.4.0"
  }
}
"#;

const SELF_DEP_MANIFEST: &str = r#"{
  "name": "vue-grid-kit",
  "version": "1.9.0",
  "dependencies": {
    "vue": "^3.4.0",
    "vue-grid-kit": "^1.9.0"
  }
}
"#;

fn setup(manifest: &str) -> (TempDir, ReleaseContext, MockPackageManager) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("package.json"), manifest).unwrap();
    let ctx = ReleaseContext::new(dir.path(), ReleaseConfig::default());
    let npm = MockPackageManager::new(ctx.manifest_path());
    (dir, ctx, npm)
}

fn args(version_type: &str) -> ReleaseArgs {
    ReleaseArgs {
        version_type: version_type.to_string(),
        ..ReleaseArgs::default()
    }
}

fn read_manifest(ctx: &ReleaseContext) -> PackageManifest {
    PackageManifest::load(ctx.manifest_path()).unwrap()
}

#[test]
fn test_default_args_release_a_patch() {
    assert_eq!(ReleaseArgs::default().version_type, "patch");
    assert!(!ReleaseArgs::default().force);
}

#[test]
fn test_invalid_version_type_mutates_nothing() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("main");

    let err = run_release(&args("gigantic"), &ctx, &repo, &npm).unwrap_err();

    assert!(matches!(err, ReleaseError::InvalidArgument(_)));
    assert!(repo.operations().is_empty());
    assert!(npm.operations().is_empty());
    assert_eq!(fs::read_to_string(ctx.manifest_path()).unwrap(), PLAIN_MANIFEST);
}

#[test]
fn test_invalid_version_type_is_reported_before_branch_check() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("feature/x").with_changes(&["?? junk"]);

    let err = run_release(&args("nope"), &ctx, &repo, &npm).unwrap_err();
    assert!(matches!(err, ReleaseError::InvalidArgument(_)));
}

#[test]
fn test_non_release_branch_without_force_is_refused() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("feature/resize");

    let err = run_release(&args("patch"), &ctx, &repo, &npm).unwrap_err();

    match err {
        ReleaseError::UnsafeBranch { branch, allowed } => {
            assert_eq!(branch, "feature/resize");
            assert_eq!(allowed, vec!["main", "master"]);
        }
        other => panic!("expected UnsafeBranch, got {:?}", other),
    }
    assert!(repo.operations().is_empty());
    assert!(npm.operations().is_empty());
}

#[test]
fn test_force_proceeds_to_working_tree_check() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("feature/resize").with_changes(&[" M src/lib.ts"]);
    let forced = ReleaseArgs {
        force: true,
        ..args("patch")
    };

    let err = run_release(&forced, &ctx, &repo, &npm).unwrap_err();
    assert!(matches!(err, ReleaseError::DirtyWorkingTree { .. }));
}

#[test]
fn test_force_on_other_branch_releases() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("hotfix");
    let forced = ReleaseArgs {
        force: true,
        ..args("patch")
    };

    let outcome = run_release(&forced, &ctx, &repo, &npm).unwrap();
    assert_eq!(outcome.version, "1.2.4");
    assert!(repo.operations().contains(&GitOperation::PushBranch {
        remote: "origin".to_string(),
        branch: "hotfix".to_string(),
    }));
}

#[test]
fn test_dirty_tree_stops_before_version_bump() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("master").with_changes(&["M  package.json", "?? notes.md"]);

    let err = run_release(&args("minor"), &ctx, &repo, &npm).unwrap_err();

    match err {
        ReleaseError::DirtyWorkingTree { paths } => {
            assert_eq!(paths, vec!["M  package.json", "?? notes.md"]);
        }
        other => panic!("expected DirtyWorkingTree, got {:?}", other),
    }
    assert!(npm.operations().is_empty());
    assert_eq!(read_manifest(&ctx).version(), "1.2.3");
}

#[test]
fn test_patch_release_runs_every_step_in_order() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("main");

    let outcome = run_release(&args("patch"), &ctx, &repo, &npm).unwrap();

    assert_eq!(outcome.version, "1.2.4");
    assert_eq!(outcome.tag, "v1.2.4");
    assert!(!outcome.dependency_updated);
    assert!(!outcome.dry_run);
    assert_eq!(read_manifest(&ctx).version(), "1.2.4");

    assert_eq!(
        npm.operations(),
        vec![
            NpmOperation::Version(VersionBump::Patch),
            NpmOperation::RunScript("build:all".to_string()),
            NpmOperation::Publish,
        ]
    );
    assert_eq!(
        repo.operations(),
        vec![
            GitOperation::Stage(vec!["package.json".to_string()]),
            GitOperation::Stage(vec!["docs/".to_string()]),
            GitOperation::Commit("release: v1.2.4".to_string()),
            GitOperation::Tag("v1.2.4".to_string()),
            GitOperation::PushBranch {
                remote: "origin".to_string(),
                branch: "main".to_string(),
            },
            GitOperation::PushTags {
                remote: "origin".to_string(),
            },
        ]
    );
}

#[test]
fn test_self_dependency_is_propagated_and_committed() {
    let (_dir, ctx, npm) = setup(SELF_DEP_MANIFEST);
    let repo = MockRepository::new("main");

    let outcome = run_release(&args("major"), &ctx, &repo, &npm).unwrap();

    assert_eq!(outcome.version, "2.0.0");
    assert!(outcome.dependency_updated);

    let manifest = read_manifest(&ctx);
    assert_eq!(manifest.version(), "2.0.0");
    assert_eq!(manifest.self_dependency(), Some("^2.0.0"));
    assert_eq!(manifest.dependency("vue"), Some("^3.4.0"));

    assert_eq!(
        repo.commits(),
        vec![
            "release: v2.0.0".to_string(),
            "chore: update vue-grid-kit to v2.0.0".to_string(),
        ]
    );

    let ops = repo.operations();
    let tail = &ops[ops.len() - 3..];
    assert_eq!(
        tail,
        &[
            GitOperation::Stage(vec!["package.json".to_string()]),
            GitOperation::Commit("chore: update vue-grid-kit to v2.0.0".to_string()),
            GitOperation::PushBranch {
                remote: "origin".to_string(),
                branch: "main".to_string(),
            },
        ]
    );
}

#[test]
fn test_no_self_dependency_means_single_commit() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("main");

    let outcome = run_release(&args("patch"), &ctx, &repo, &npm).unwrap();

    assert!(!outcome.dependency_updated);
    assert_eq!(repo.commits(), vec!["release: v1.2.4".to_string()]);
}

#[test]
fn test_build_failure_stops_before_commit() {
    let (_dir, ctx, _) = setup(PLAIN_MANIFEST);
    let npm = MockPackageManager::new(ctx.manifest_path()).failing_on("run");
    let repo = MockRepository::new("main");

    let err = run_release(&args("patch"), &ctx, &repo, &npm).unwrap_err();

    match err {
        ReleaseError::StepFailure { step, message } => {
            assert_eq!(step, "Build failed");
            assert!(message.contains("simulated npm run failure"));
        }
        other => panic!("expected StepFailure, got {:?}", other),
    }
    assert!(repo.operations().is_empty());
    assert_eq!(npm.operations(), vec![NpmOperation::Version(VersionBump::Patch)]);
    // The bump itself is not rolled back.
    assert_eq!(read_manifest(&ctx).version(), "1.2.4");
}

#[test]
fn test_push_failure_leaves_local_commit_and_tag() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("main").failing_on("push");

    let err = run_release(&args("patch"), &ctx, &repo, &npm).unwrap_err();

    assert!(err.to_string().starts_with("Pushing commits failed"));
    assert_eq!(repo.commits(), vec!["release: v1.2.4".to_string()]);
    assert_eq!(repo.tags(), vec!["v1.2.4".to_string()]);
    assert!(!npm.operations().contains(&NpmOperation::Publish));
}

#[test]
fn test_publish_failure_skips_dependency_update() {
    let (_dir, ctx, _) = setup(SELF_DEP_MANIFEST);
    let npm = MockPackageManager::new(ctx.manifest_path()).failing_on("publish");
    let repo = MockRepository::new("main");

    let err = run_release(&args("minor"), &ctx, &repo, &npm).unwrap_err();

    assert!(err.to_string().starts_with("Publishing failed"));
    assert_eq!(repo.commits(), vec!["release: v1.10.0".to_string()]);
    assert_eq!(read_manifest(&ctx).self_dependency(), Some("^1.9.0"));
}

#[test]
fn test_version_bump_failure_is_a_step_failure() {
    let (_dir, ctx, _) = setup(PLAIN_MANIFEST);
    let npm = MockPackageManager::new(ctx.manifest_path()).failing_on("version");
    let repo = MockRepository::new("main");

    let err = run_release(&args("patch"), &ctx, &repo, &npm).unwrap_err();
    assert!(err.to_string().starts_with("Version bump failed"));
    assert!(repo.operations().is_empty());
}

#[test]
fn test_detached_head_with_force_fails_at_push() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("");
    let forced = ReleaseArgs {
        force: true,
        ..args("patch")
    };

    let err = run_release(&forced, &ctx, &repo, &npm).unwrap_err();
    assert!(err.to_string().contains("HEAD is detached"));
    assert_eq!(repo.tags(), vec!["v1.2.4".to_string()]);
}

#[test]
fn test_prerelease_with_configured_preid() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("package.json"), PLAIN_MANIFEST).unwrap();
    let mut config = ReleaseConfig::default();
    config.npm.preid = Some("beta".to_string());
    config.repository.tag_prefix = "release-".to_string();
    let ctx = ReleaseContext::new(dir.path(), config);
    let npm = MockPackageManager::new(ctx.manifest_path());
    let repo = MockRepository::new("main");

    let outcome = run_release(&args("prerelease"), &ctx, &repo, &npm).unwrap();

    assert_eq!(outcome.version, "1.2.4-beta.0");
    assert_eq!(outcome.tag, "release-1.2.4-beta.0");
    assert_eq!(repo.commits(), vec!["release: v1.2.4-beta.0".to_string()]);
}

#[test]
fn test_dry_run_predicts_without_mutating() {
    let (_dir, ctx, npm) = setup(SELF_DEP_MANIFEST);
    let repo = MockRepository::new("main");
    let dry = ReleaseArgs {
        dry_run: true,
        ..args("premajor")
    };

    let outcome = run_release(&dry, &ctx, &repo, &npm).unwrap();

    assert!(outcome.dry_run);
    assert_eq!(outcome.version, "2.0.0-0");
    assert_eq!(outcome.tag, "v2.0.0-0");
    assert!(repo.operations().is_empty());
    assert!(npm.operations().is_empty());
    assert_eq!(
        fs::read_to_string(ctx.manifest_path()).unwrap(),
        SELF_DEP_MANIFEST
    );
}

#[test]
fn test_dry_run_still_checks_preconditions() {
    let (_dir, ctx, npm) = setup(PLAIN_MANIFEST);
    let repo = MockRepository::new("main").with_changes(&["?? dist/"]);
    let dry = ReleaseArgs {
        dry_run: true,
        ..args("patch")
    };

    assert!(matches!(
        run_release(&dry, &ctx, &repo, &npm),
        Err(ReleaseError::DirtyWorkingTree { .. })
    ));
}

/// Stand-in for npm that, like the real one, only touches `./package.json`
#[cfg(unix)]
const FAKE_NPM: &str = r#"#!/bin/sh
case "$1" in
  version)
    test -f package.json || exit 1
    sed 's/"version": "1.2.3"/"version": "1.2.4"/' package.json > package.json.next
    mv package.json.next package.json
    ;;
esac
exit 0
"#;

#[cfg(unix)]
#[test]
fn test_nested_manifest_is_bumped_and_released() {
    use npm_release::npm::NpmCli;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let package_dir = dir.path().join("packages").join("grid");
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(package_dir.join("package.json"), PLAIN_MANIFEST).unwrap();

    let bin_dir = tempfile::tempdir().unwrap();
    let fake_npm = bin_dir.path().join("npm");
    fs::write(&fake_npm, FAKE_NPM).unwrap();
    fs::set_permissions(&fake_npm, fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = ReleaseConfig::default();
    config.package.manifest = "packages/grid/package.json".to_string();
    config.npm.program = fake_npm.to_string_lossy().into_owned();
    let ctx = ReleaseContext::new(dir.path(), config);
    let npm = NpmCli::from_context(&ctx);
    let repo = MockRepository::new("main");

    let outcome = run_release(&args("patch"), &ctx, &repo, &npm).unwrap();

    assert_eq!(outcome.version, "1.2.4");
    assert_eq!(read_manifest(&ctx).version(), "1.2.4");
    assert!(!dir.path().join("package.json").exists());
    assert_eq!(
        repo.operations()[0],
        GitOperation::Stage(vec!["packages/grid/package.json".to_string()])
    );
    assert_eq!(repo.tags(), vec!["v1.2.4".to_string()]);
}
