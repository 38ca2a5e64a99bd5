use super::GitCommand;
use anyhow::{Context, Result};

impl GitCommand {
    /// Check if working directory has uncommitted or untracked changes.
    /// Ignored files do not count.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let stdout = self.run(&["status", "--porcelain"], "status")?;
        Ok(!stdout.trim().is_empty())
    }

    /// Stash all changes including untracked files
    pub fn stash_push_with_untracked(&self, message: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["stash", "push", "-u", "-m", message]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        let output = cmd
            .output()
            .context("Failed to execute git stash push command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git stash push failed: {}", stderr.trim());
        }

        Ok(())
    }

    /// Pop the most recent stash
    pub fn stash_pop(&self) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["stash", "pop"]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        let output = cmd
            .output()
            .context("Failed to execute git stash pop command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git stash pop failed: {}", stderr.trim());
        }

        Ok(())
    }
}
