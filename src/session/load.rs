//! Background jobs the session asks the runtime to perform.

use super::Msg;
use crate::config::{ConfigLocation, SyncConfig};
use crate::core::{collect, driver, Collection, FnSink, RepoOps, SyncError, SyncStep};
use anyhow::Context;
use tracing::info;

/// Work that touches git for long enough that it must not block input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Resolve configuration, fetch the base and collect branches.
    Load,
    /// Re-collect branch info without fetching.
    Refresh(SyncConfig),
    /// Run one workflow step.
    Step { step: SyncStep, config: SyncConfig },
}

/// Everything the browsing view needs after startup.
#[derive(Debug)]
pub struct LoadedRepo {
    pub config: SyncConfig,
    /// The branch checked out at load time; `None` on a detached HEAD.
    pub current_branch: Option<String>,
    pub collection: Collection,
}

/// Config, then fetch, then current branch, then branch info.
pub fn load(repo: &dyn RepoOps, location: &ConfigLocation) -> Result<LoadedRepo, SyncError> {
    let config = SyncConfig::load(repo, location).map_err(SyncError::Load)?;

    repo.fetch(&config.upstream_remote, &config.base_branch)
        .map_err(|source| SyncError::Fetch {
            remote: config.upstream_remote.clone(),
            branch: config.base_branch.clone(),
            source,
        })?;

    let current_branch = repo
        .current_branch()
        .context("Failed to determine the current branch")
        .map_err(SyncError::Load)?;

    let collection = refresh(repo, &config)?;
    info!(
        base = %config.base_branch,
        branches = collection.branches.len(),
        skipped = collection.skipped,
        "repository loaded"
    );

    Ok(LoadedRepo {
        config,
        current_branch,
        collection,
    })
}

/// Branch info only.
pub fn refresh(repo: &dyn RepoOps, config: &SyncConfig) -> Result<Collection, SyncError> {
    collect(repo, &config.base_branch, &config.exclude_patterns)
        .context("Failed to collect branch information")
        .map_err(SyncError::Load)
}

/// Run `job` to completion, forwarding step progress to `on_progress`.
pub fn perform(
    repo: &dyn RepoOps,
    location: &ConfigLocation,
    job: Job,
    on_progress: impl FnMut(String),
) -> Msg {
    match job {
        Job::Load => Msg::Loaded(load(repo, location)),
        Job::Refresh(config) => Msg::Refreshed(refresh(repo, &config)),
        Job::Step { step, config } => {
            let mut sink = FnSink(on_progress);
            Msg::StepDone(driver::execute_step(repo, &config, &step, &mut sink))
        }
    }
}
