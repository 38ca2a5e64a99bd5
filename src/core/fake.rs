//! In-memory `RepoOps` for engine and session tests.
//!
//! Mutating operations (and fetch) append a git-like line to the log when
//! attempted, whether or not they then fail. Failures are injected by key:
//! either the bare operation (`"fetch"`) or `"op:arg"` (`"push:main"`).

use super::RepoOps;
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    branches: Vec<String>,
    current: Option<String>,
    counts: HashMap<String, (u32, u32)>,
    descriptions: HashMap<String, String>,
    broken_info: HashSet<String>,
    conflicts: HashSet<String>,
    failing: HashSet<String>,
    local_only: u32,
    remotes: Vec<String>,
    remote_head: Option<String>,
    dirty: bool,
    stashes: usize,
    log: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeRepo {
    state: Mutex<State>,
}

impl FakeRepo {
    /// A clean repository with `branches`, the first one checked out.
    pub fn new(branches: &[&str]) -> Self {
        let state = State {
            branches: branches.iter().map(|b| b.to_string()).collect(),
            current: branches.first().map(|b| b.to_string()),
            remotes: vec!["origin".to_string(), "upstream".to_string()],
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn edit(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_counts(self, branch: &str, behind: u32, ahead: u32) -> Self {
        self.edit(|s| {
            s.counts.insert(branch.to_string(), (behind, ahead));
        })
    }

    pub fn with_description(self, branch: &str, text: &str) -> Self {
        self.edit(|s| {
            s.descriptions.insert(branch.to_string(), text.to_string());
        })
    }

    pub fn with_broken_info(self, branch: &str) -> Self {
        self.edit(|s| {
            s.broken_info.insert(branch.to_string());
        })
    }

    pub fn with_conflict(self, branch: &str) -> Self {
        self.edit(|s| {
            s.conflicts.insert(branch.to_string());
        })
    }

    pub fn with_failing(self, key: &str) -> Self {
        self.edit(|s| {
            s.failing.insert(key.to_string());
        })
    }

    pub fn with_local_only(self, count: u32) -> Self {
        self.edit(|s| s.local_only = count)
    }

    pub fn with_remotes(self, remotes: &[&str]) -> Self {
        self.edit(|s| s.remotes = remotes.iter().map(|r| r.to_string()).collect())
    }

    pub fn with_remote_head(self, branch: &str) -> Self {
        self.edit(|s| s.remote_head = Some(branch.to_string()))
    }

    pub fn dirty(self) -> Self {
        self.edit(|s| s.dirty = true)
    }

    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    pub fn current(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    pub fn stash_depth(&self) -> usize {
        self.state.lock().unwrap().stashes
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().unwrap().dirty
    }

    pub fn description(&self, branch: &str) -> Option<String> {
        self.state.lock().unwrap().descriptions.get(branch).cloned()
    }
}

impl State {
    fn check(&self, op: &str, arg: &str) -> Result<()> {
        if self.failing.contains(op) || self.failing.contains(&format!("{op}:{arg}")) {
            bail!("Git {op} failed: injected failure for '{arg}'");
        }
        Ok(())
    }

    fn record(&mut self, line: String) {
        self.log.push(line);
    }
}

impl RepoOps for FakeRepo {
    fn is_repo(&self) -> Result<bool> {
        Ok(true)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let s = self.state.lock().unwrap();
        s.check("current", "")?;
        Ok(s.current.clone())
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        let s = self.state.lock().unwrap();
        s.check("list", "")?;
        Ok(s.branches.clone())
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        let s = self.state.lock().unwrap();
        s.check("remotes", "")?;
        Ok(s.remotes.clone())
    }

    fn remote_head_branch(&self, remote: &str) -> Result<Option<String>> {
        let s = self.state.lock().unwrap();
        s.check("remote_head", remote)?;
        Ok(s.remote_head.clone())
    }

    fn last_commit_relative(&self, branch: &str) -> Result<String> {
        let s = self.state.lock().unwrap();
        if s.broken_info.contains(branch) {
            bail!("Git log failed: bad revision '{branch}'");
        }
        Ok("2 days ago".to_string())
    }

    fn ahead_behind(&self, _base: &str, branch: &str) -> Result<(u32, u32)> {
        let s = self.state.lock().unwrap();
        if s.broken_info.contains(branch) {
            bail!("Git rev-list failed: bad revision '{branch}'");
        }
        Ok(s.counts.get(branch).copied().unwrap_or((0, 0)))
    }

    fn count_local_only(&self, branch: &str, _upstream_ref: &str) -> Result<u32> {
        let s = self.state.lock().unwrap();
        s.check("rev-list", branch)?;
        Ok(s.local_only)
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("fetch {remote} {branch}"));
        s.check("fetch", branch)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("checkout {branch}"));
        s.check("checkout", branch)?;
        if !s.branches.iter().any(|b| b == branch) {
            bail!("Git checkout failed: pathspec '{branch}' did not match");
        }
        s.current = Some(branch.to_string());
        Ok(())
    }

    fn reset_hard(&self, target: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("reset --hard {target}"));
        s.check("reset", target)
    }

    fn push_with_lease(&self, remote: &str, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("push --force-with-lease {remote} {branch}"));
        s.check("push", branch)
    }

    fn rebase(&self, onto: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("rebase {onto}"));
        let current = s.current.clone().unwrap_or_default();
        s.check("rebase", &current)?;
        if s.conflicts.contains(&current) {
            bail!("Git rebase failed: CONFLICT (content): Merge conflict in src/lib.rs");
        }
        if let Some(counts) = s.counts.get_mut(&current) {
            counts.0 = 0;
        }
        Ok(())
    }

    fn rebase_abort(&self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("rebase --abort".to_string());
        s.check("rebase --abort", "")
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("branch -d {branch}"));
        s.check("branch -d", branch)?;
        s.branches.retain(|b| b != branch);
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(format!("push {remote} --delete {branch}"));
        s.check("push --delete", branch)
    }

    fn stash_save(&self, _message: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("stash push".to_string());
        s.check("stash push", "")?;
        s.dirty = false;
        s.stashes += 1;
        Ok(())
    }

    fn stash_pop(&self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("stash pop".to_string());
        s.check("stash pop", "")?;
        if s.stashes == 0 {
            bail!("Git stash pop failed: No stash entries found.");
        }
        s.stashes -= 1;
        s.dirty = true;
        Ok(())
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let s = self.state.lock().unwrap();
        s.check("status", "")?;
        Ok(s.dirty)
    }

    fn branch_description(&self, branch: &str) -> Result<Option<String>> {
        let s = self.state.lock().unwrap();
        Ok(s.descriptions.get(branch).cloned())
    }

    fn set_branch_description(&self, branch: &str, description: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.check("describe", branch)?;
        s.descriptions
            .insert(branch.to_string(), description.to_string());
        Ok(())
    }

    fn unset_branch_description(&self, branch: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.check("describe", branch)?;
        s.descriptions.remove(branch);
        Ok(())
    }
}
