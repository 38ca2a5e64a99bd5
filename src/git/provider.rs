//! `RepoOps` backed by the `git` binary.

use super::{config::description_key, GitCommand};
use crate::core::RepoOps;
use anyhow::Result;

impl RepoOps for GitCommand {
    fn is_repo(&self) -> Result<bool> {
        self.rev_parse_is_inside_work_tree()
    }

    fn current_branch(&self) -> Result<Option<String>> {
        GitCommand::current_branch(self)
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        self.branch_list()
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        self.remote_list()
    }

    fn remote_head_branch(&self, remote: &str) -> Result<Option<String>> {
        GitCommand::remote_head_branch(self, remote)
    }

    fn last_commit_relative(&self, branch: &str) -> Result<String> {
        GitCommand::last_commit_relative(self, branch)
    }

    fn ahead_behind(&self, base: &str, branch: &str) -> Result<(u32, u32)> {
        self.rev_list_left_right(base, branch)
    }

    fn count_local_only(&self, branch: &str, upstream_ref: &str) -> Result<u32> {
        self.rev_list_count(&format!("{upstream_ref}..{branch}"))
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.fetch_branch(remote, branch)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        GitCommand::checkout(self, branch)
    }

    fn reset_hard(&self, target: &str) -> Result<()> {
        GitCommand::reset_hard(self, target)
    }

    fn push_with_lease(&self, remote: &str, branch: &str) -> Result<()> {
        self.push_force_with_lease(remote, branch)
    }

    fn rebase(&self, onto: &str) -> Result<()> {
        GitCommand::rebase(self, onto).map(drop)
    }

    fn rebase_abort(&self) -> Result<()> {
        GitCommand::rebase_abort(self)
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        self.branch_delete(branch)
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push_delete(remote, branch)
    }

    fn stash_save(&self, message: &str) -> Result<()> {
        self.stash_push_with_untracked(message)
    }

    fn stash_pop(&self) -> Result<()> {
        GitCommand::stash_pop(self)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        GitCommand::has_uncommitted_changes(self)
    }

    fn branch_description(&self, branch: &str) -> Result<Option<String>> {
        self.config_get(&description_key(branch))
    }

    fn set_branch_description(&self, branch: &str, description: &str) -> Result<()> {
        self.config_set(&description_key(branch), description)
    }

    fn unset_branch_description(&self, branch: &str) -> Result<()> {
        self.config_unset(&description_key(branch))
    }
}
