//! Sequential update/delete pipeline over a queue of branches.
//!
//! The driver never runs git itself. It hands out one [`SyncStep`] at a
//! time, the caller executes it (usually on a worker thread via
//! [`execute_step`]) and feeds the resulting [`StepEvent`] back through
//! [`SyncDriver::complete`]. A new step is only handed out after the
//! previous one completed, so checkout-mutating operations never overlap.

use super::{guard, Failure, FailureReason, ProgressSink, RepoOps, SyncError, SyncMode};
use crate::config::SyncConfig;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Done,
}

/// The unit of work for one queue position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStep {
    pub mode: SyncMode,
    pub branch: String,
    pub position: usize,
    /// Run the divergence and fetch guard before touching the branch.
    pub prepare_base: bool,
}

#[derive(Debug)]
pub enum StepOutcome {
    Success,
    Failed(FailureReason),
    /// The base could not be prepared; nothing else in the queue may run.
    Aborted(SyncError),
}

/// Completion report for one step.
#[derive(Debug)]
pub struct StepEvent {
    pub branch: String,
    pub position: usize,
    pub outcome: StepOutcome,
}

/// Aggregated outcome of one workflow run.
#[derive(Debug, Default)]
pub struct SyncResult {
    pub success_count: usize,
    /// Failures in queue order.
    pub failures: Vec<Failure>,
    /// Set when the base update failed and the queue was abandoned.
    pub aborted: Option<SyncError>,
    /// Queue entries never attempted because of an abort.
    pub not_attempted: Vec<String>,
}

impl SyncResult {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.aborted.is_none()
    }
}

/// State machine for one workflow: `Idle → Running → Done`.
#[derive(Debug)]
pub struct SyncDriver {
    mode: SyncMode,
    queue: Vec<String>,
    index: usize,
    state: DriverState,
    result: SyncResult,
}

impl SyncDriver {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            queue: Vec::new(),
            index: 0,
            state: DriverState::Idle,
            result: SyncResult::default(),
        }
    }

    /// Fix the queue and hand out the first step. An empty queue goes
    /// straight to `Done`. Calling this on a driver that already started
    /// does nothing.
    pub fn start(&mut self, queue: Vec<String>) -> Option<SyncStep> {
        if self.state != DriverState::Idle {
            return None;
        }
        info!(mode = self.mode.verb(), count = queue.len(), "workflow started");
        self.queue = queue;
        self.state = DriverState::Running;
        self.next_step()
    }

    /// Record the outcome of the in-flight step and hand out the next one.
    /// Returns `None` once the driver is `Done`.
    pub fn complete(&mut self, event: StepEvent) -> Option<SyncStep> {
        if self.state != DriverState::Running || event.position != self.index {
            warn!(
                branch = %event.branch,
                position = event.position,
                "ignoring completion that does not match the in-flight step"
            );
            return None;
        }

        match event.outcome {
            StepOutcome::Success => {
                debug!(branch = %event.branch, "step succeeded");
                self.result.success_count += 1;
            }
            StepOutcome::Failed(reason) => {
                debug!(branch = %event.branch, %reason, "step failed");
                self.result.failures.push(Failure {
                    branch: event.branch,
                    reason,
                });
            }
            StepOutcome::Aborted(err) => {
                warn!(branch = %event.branch, "workflow aborted: {err}");
                self.result.failures.push(Failure {
                    branch: event.branch,
                    reason: FailureReason::BaseUpdateFailed,
                });
                self.result.aborted = Some(err);
                self.result.not_attempted = self.queue[self.index + 1..].to_vec();
                self.finish();
                return None;
            }
        }

        self.index += 1;
        self.next_step()
    }

    fn next_step(&mut self) -> Option<SyncStep> {
        match self.queue.get(self.index) {
            Some(branch) => Some(SyncStep {
                mode: self.mode,
                branch: branch.clone(),
                position: self.index,
                prepare_base: self.mode == SyncMode::Update && self.index == 0,
            }),
            None => {
                self.finish();
                None
            }
        }
    }

    fn finish(&mut self) {
        self.state = DriverState::Done;
        info!(
            mode = self.mode.verb(),
            succeeded = self.result.success_count,
            failed = self.result.failures.len(),
            "workflow finished"
        );
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    /// Number of completed queue positions.
    pub fn completed(&self) -> usize {
        match self.state {
            DriverState::Done => self.queue.len() - self.result.not_attempted.len(),
            _ => self.index,
        }
    }

    pub fn result(&self) -> &SyncResult {
        &self.result
    }

    /// Move the abort error out so it can be shown; the rest of the result stays.
    pub fn take_aborted(&mut self) -> Option<SyncError> {
        self.result.aborted.take()
    }
}

/// Execute one step against the repository.
pub fn execute_step(
    repo: &dyn RepoOps,
    config: &SyncConfig,
    step: &SyncStep,
    progress: &mut dyn ProgressSink,
) -> StepEvent {
    let outcome = match step.mode {
        SyncMode::Update => update_branch(repo, config, step, progress),
        SyncMode::Delete => delete_branch(repo, config, &step.branch, progress),
    };
    StepEvent {
        branch: step.branch.clone(),
        position: step.position,
        outcome,
    }
}

fn update_branch(
    repo: &dyn RepoOps,
    config: &SyncConfig,
    step: &SyncStep,
    progress: &mut dyn ProgressSink,
) -> StepOutcome {
    if step.prepare_base {
        if let Err(e) = guard::prepare_base(repo, config, progress) {
            return StepOutcome::Aborted(e);
        }
    }

    let branch = step.branch.as_str();
    let base = config.base_branch.as_str();

    progress.on_step(&format!("Checking out {branch}"));
    if let Err(e) = repo.checkout(branch) {
        return StepOutcome::Failed(FailureReason::CheckoutFailed(format!("{e:#}")));
    }

    progress.on_step(&format!("Rebasing {branch} onto {base}"));
    if let Err(e) = repo.rebase(base) {
        // Abort the failed rebase to leave the branch as it was
        if let Err(abort_err) = repo.rebase_abort() {
            progress.on_warning(&format!(
                "Failed to abort rebase of '{branch}': {abort_err:#}"
            ));
        }
        return StepOutcome::Failed(FailureReason::Conflict(format!("{e:#}")));
    }

    let origin = config.origin_remote.as_str();
    progress.on_step(&format!("Pushing {branch} to {origin}"));
    if let Err(e) = repo.push_with_lease(origin, branch) {
        return StepOutcome::Failed(FailureReason::PushFailed(format!("{e:#}")));
    }

    StepOutcome::Success
}

fn delete_branch(
    repo: &dyn RepoOps,
    config: &SyncConfig,
    branch: &str,
    progress: &mut dyn ProgressSink,
) -> StepOutcome {
    progress.on_step(&format!("Deleting local branch {branch}"));
    if let Err(e) = repo.delete_local_branch(branch) {
        return StepOutcome::Failed(FailureReason::DeleteLocalFailed(format!("{e:#}")));
    }

    let origin = config.origin_remote.as_str();
    progress.on_step(&format!("Deleting {origin}/{branch}"));
    if let Err(e) = repo.delete_remote_branch(origin, branch) {
        return StepOutcome::Failed(FailureReason::DeleteRemoteFailed(format!("{e:#}")));
    }

    StepOutcome::Success
}

/// Drive a whole queue to completion on the calling thread.
pub fn run(
    repo: &dyn RepoOps,
    config: &SyncConfig,
    mode: SyncMode,
    queue: Vec<String>,
    progress: &mut dyn ProgressSink,
) -> SyncResult {
    let mut driver = SyncDriver::new(mode);
    let mut next = driver.start(queue);
    while let Some(step) = next {
        let event = execute_step(repo, config, &step, progress);
        next = driver.complete(event);
    }
    driver.result
}

/// The git commands a workflow over `queue` is expected to run, for preview.
pub fn planned_commands(config: &SyncConfig, mode: SyncMode, queue: &[String]) -> Vec<String> {
    let base = &config.base_branch;
    let origin = &config.origin_remote;
    let mut commands = Vec::new();

    match mode {
        SyncMode::Update => {
            commands.push(format!("git fetch {} {base}", config.upstream_remote));
            commands.push(format!("git checkout {base}"));
            commands.push(format!("git reset --hard {}", config.upstream_ref()));
            commands.push(format!("git push --force-with-lease {origin} {base}"));
            for branch in queue {
                commands.push(format!("git checkout {branch}"));
                commands.push(format!("git rebase {base}"));
                commands.push(format!("git push --force-with-lease {origin} {branch}"));
            }
        }
        SyncMode::Delete => {
            for branch in queue {
                commands.push(format!("git branch -d {branch}"));
                commands.push(format!("git push {origin} --delete {branch}"));
            }
        }
    }

    commands
}
