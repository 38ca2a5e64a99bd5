//! Branch synchronization engine.
//!
//! Everything in here talks to the repository only through [`RepoOps`], so
//! the engine can run against the real `git` binary or an in-memory fake.
//! Progress is reported through [`ProgressSink`] rather than printed, since
//! the terminal belongs to the TUI.

mod branch;
pub mod collect;
pub mod driver;
mod error;
pub mod guard;
mod progress;
pub mod stash;

#[cfg(test)]
pub(crate) mod fake;

pub use branch::{Branch, BranchStatus, SyncMode};
pub use collect::{collect, Collection};
pub use driver::{DriverState, StepEvent, StepOutcome, SyncDriver, SyncResult, SyncStep};
pub use error::{Failure, FailureReason, SyncError};
pub use progress::FnSink;
pub use stash::StashGuard;

use anyhow::Result;

// ─────────────────────────────────────────────────────────────────────────
// Repository operations
// ─────────────────────────────────────────────────────────────────────────

/// Every repository operation the engine performs.
///
/// Each call is one synchronous operation against the working directory.
/// Failures carry git's diagnostic text. Implementations must never prompt.
pub trait RepoOps: Send + Sync {
    fn is_repo(&self) -> Result<bool>;

    /// The checked-out branch, `None` on a detached HEAD.
    fn current_branch(&self) -> Result<Option<String>>;

    fn list_local_branches(&self) -> Result<Vec<String>>;

    fn list_remotes(&self) -> Result<Vec<String>>;

    /// The branch the remote's HEAD points at, if it advertises one.
    fn remote_head_branch(&self, remote: &str) -> Result<Option<String>>;

    fn last_commit_relative(&self, branch: &str) -> Result<String>;

    /// `(behind, ahead)` of `branch` relative to `base`.
    fn ahead_behind(&self, base: &str, branch: &str) -> Result<(u32, u32)>;

    /// Commits reachable from `branch` but not from `upstream_ref`.
    fn count_local_only(&self, branch: &str, upstream_ref: &str) -> Result<u32>;

    fn fetch(&self, remote: &str, branch: &str) -> Result<()>;

    fn checkout(&self, branch: &str) -> Result<()>;

    fn reset_hard(&self, target: &str) -> Result<()>;

    fn push_with_lease(&self, remote: &str, branch: &str) -> Result<()>;

    fn rebase(&self, onto: &str) -> Result<()>;

    fn rebase_abort(&self) -> Result<()>;

    fn delete_local_branch(&self, branch: &str) -> Result<()>;

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()>;

    fn stash_save(&self, message: &str) -> Result<()>;

    fn stash_pop(&self) -> Result<()>;

    fn has_uncommitted_changes(&self) -> Result<bool>;

    fn branch_description(&self, branch: &str) -> Result<Option<String>>;

    fn set_branch_description(&self, branch: &str, description: &str) -> Result<()>;

    fn unset_branch_description(&self, branch: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────
// Progress reporting
// ─────────────────────────────────────────────────────────────────────────

/// Trait for engine operations to report progress without depending on a UI.
pub trait ProgressSink {
    /// Report an intermediate step.
    fn on_step(&mut self, msg: &str);

    /// Report a non-fatal problem.
    fn on_warning(&mut self, msg: &str);
}

/// A no-op sink that discards all progress messages.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_step(&mut self, _msg: &str) {}
    fn on_warning(&mut self, _msg: &str) {}
}
