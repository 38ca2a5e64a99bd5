//! Stash guard: set uncommitted work aside before a workflow and put it
//! back exactly once afterwards.

use super::{RepoOps, SyncError};
use tracing::{debug, info};

/// Message attached to stashes created by gitsync.
pub const STASH_MESSAGE: &str = "gitsync: auto-stash before sync";

/// Tracks whether this session owes the user a `stash pop`.
#[derive(Debug, Default)]
pub struct StashGuard {
    owed: bool,
}

impl StashGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the working tree must be stashed before a workflow can run.
    pub fn needs_stash(repo: &dyn RepoOps) -> Result<bool, SyncError> {
        repo.has_uncommitted_changes().map_err(SyncError::Status)
    }

    /// Stash all uncommitted changes, untracked files included.
    pub fn stash(&mut self, repo: &dyn RepoOps) -> Result<(), SyncError> {
        repo.stash_save(STASH_MESSAGE).map_err(SyncError::Stash)?;
        self.owed = true;
        info!("stashed uncommitted changes");
        Ok(())
    }

    /// Pop the stash if one is owed. Returns whether a pop was attempted.
    ///
    /// The debt is cleared before popping, so a failed pop is reported once
    /// and never retried.
    pub fn restore(&mut self, repo: &dyn RepoOps) -> Result<bool, SyncError> {
        if !self.owed {
            debug!("no stash to restore");
            return Ok(false);
        }
        self.owed = false;
        repo.stash_pop().map_err(SyncError::StashPop)?;
        info!("restored stashed changes");
        Ok(true)
    }

    pub fn is_owed(&self) -> bool {
        self.owed
    }

    /// Give up the debt without popping, leaving the stash for the user.
    pub fn forget(&mut self) -> bool {
        std::mem::take(&mut self.owed)
    }
}
