//! gitsync - interactive branch synchronization
//!
//! Rebases selected feature branches onto the base branch and pushes them,
//! or deletes them locally and on the origin remote.

use crate::{
    check_dependencies,
    config::{ConfigLocation, SyncConfig, CONFIG_FILE},
    core::RepoOps,
    git::GitCommand,
    is_git_repository,
    logging::{init_logging, LOG_FILE},
    styles, tui,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "gitsync")]
#[command(version = crate::VERSION)]
#[command(about = "Keep feature branches rebased onto a shared base branch")]
#[command(long_about = r#"
Keeps feature branches rebased onto a shared base branch.

On start, the base branch is fetched from the upstream remote and every
local branch is listed with its ahead/behind counts. Select branches and
press enter to update them:

  1. The local base is checked for commits upstream does not have. If any
     exist, nothing is changed and the run stops.
  2. The local base is hard-reset to upstream and pushed to origin.
  3. Each selected branch is rebased onto the base and pushed with
     --force-with-lease. Conflicting rebases are aborted and reported.

Press d twice to delete the selected branches locally (git branch -d) and
on origin instead. Uncommitted changes are stashed on request and restored
when the run ends.

Settings are read from .gitsync.yaml at the repository top level. Fields it
leaves out are detected from the repository's remotes and branches.
"#)]
pub struct Args {
    #[arg(short, long, help = "Ask for confirmation before each run")]
    manual: bool,

    #[arg(short, long, help = "Log git commands and workflow steps at debug level")]
    verbose: bool,

    #[arg(long, value_name = "PATH", help = "Read settings from this file instead of .gitsync.yaml")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Write logs here instead of <git-dir>/gitsync.log")]
    log_file: Option<PathBuf>,

    #[arg(long, help = "Write the resolved settings to .gitsync.yaml and exit")]
    write_config: bool,
}

/// Parse arguments and run. Returns the process exit code.
pub fn run() -> Result<i32> {
    let args = Args::parse();
    check_dependencies()?;

    if !is_git_repository()? {
        eprintln!("Error: Not inside a Git repository");
        return Ok(1);
    }

    let git = GitCommand::new(true);
    let toplevel = git
        .show_toplevel()
        .context("Failed to locate the repository top level")?;
    let log_file = match args.log_file {
        Some(path) => path,
        None => git.git_dir()?.join(LOG_FILE),
    };
    if let Err(e) = init_logging(args.verbose, &log_file) {
        eprintln!("Warning: {e:#}");
    }
    info!(version = crate::VERSION, toplevel = %toplevel.display(), "gitsync starting");

    let location = ConfigLocation::resolve(args.config, &toplevel);
    if let ConfigLocation::Explicit(path) = &location {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }

    if args.write_config {
        let config = SyncConfig::load(&git, &location)?;
        let path = toplevel.join(CONFIG_FILE);
        config.save(&path)?;
        println!("Wrote {}", styles::bold(&path.display().to_string()));
        return Ok(0);
    }

    let repo: Arc<dyn RepoOps> = Arc::new(git);
    tui::run(repo, location, args.manual)
}
