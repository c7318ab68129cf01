use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use npm_release::config;
use npm_release::domain::VersionBump;
use npm_release::git::Git2Repository;
use npm_release::npm::NpmCli;
use npm_release::release::{self, ReleaseArgs, ReleaseContext};
use npm_release::{ui, ReleaseError};

#[derive(clap::Parser)]
#[command(
    name = "release",
    version,
    about = "Bump, build, tag, push and publish an npm package"
)]
struct Args {
    #[arg(
        default_value = "patch",
        help = "major, minor, patch, premajor, preminor, prepatch or prerelease"
    )]
    version_type: String,

    #[arg(short, long, help = "Release even when not on a release branch")]
    force: bool,

    #[arg(long, help = "Check preconditions and print the plan without changing anything")]
    dry_run: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Repository to release (defaults to the current directory)")]
    root: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        if let Some(ReleaseError::StepFailure { .. }) = e.downcast_ref::<ReleaseError>() {
            ui::display_status(
                "Steps that completed before the failure were not rolled back; \
                 check the local branch, tags and registry before retrying",
            );
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Reject a bad bump kind before touching git or the config.
    args.version_type.parse::<VersionBump>()?;

    let start = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = Git2Repository::open(&start)
        .with_context(|| format!("Not in a git repository: {}", start.display()))?;
    let root = repo.workdir()?;

    let config =
        config::load_config(args.config.as_deref(), &root).context("Error loading config")?;
    let ctx = ReleaseContext::from_env(root, config);
    let npm = NpmCli::from_context(&ctx);

    let release_args = ReleaseArgs {
        version_type: args.version_type,
        force: args.force,
        dry_run: args.dry_run,
    };

    release::run_release(&release_args, &ctx, &repo, &npm)?;
    Ok(())
}
