use super::{output_lines, parse_remote_head, GitCommand};
use anyhow::{Context, Result};

impl GitCommand {
    pub fn remote_list(&self) -> Result<Vec<String>> {
        let output = self.run(&["remote"], "remote")?;
        Ok(output_lines(&output))
    }

    /// The branch a remote's HEAD points at, as reported by `git remote show`.
    ///
    /// This contacts the remote. `None` when the remote does not advertise a HEAD.
    pub fn remote_head_branch(&self, remote: &str) -> Result<Option<String>> {
        let output = self.run(&["remote", "show", remote], "remote show")?;
        Ok(parse_remote_head(&output))
    }

    /// Fetch a single branch, updating `refs/remotes/<remote>/<branch>`.
    pub fn fetch_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["fetch", remote, branch]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        let output = cmd
            .output()
            .context("Failed to execute git fetch command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git fetch failed: {}", stderr.trim());
        }

        Ok(())
    }

    /// Reset the current branch to a given target (e.g., `upstream/main`).
    ///
    /// Runs `git reset --hard <target>`.
    pub fn reset_hard(&self, target: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["reset", "--hard", target]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        let output = cmd
            .output()
            .context("Failed to execute git reset --hard command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git reset --hard failed: {}", stderr.trim());
        }

        Ok(())
    }

    /// Force push guarded by `--force-with-lease`; rejected if the remote
    /// ref moved since it was last fetched.
    pub fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(
            &["push", "--no-verify", "--force-with-lease", remote, branch],
            "push",
        )?;
        Ok(())
    }

    /// Delete a remote branch via `git push <remote> --delete <branch>`.
    pub fn push_delete(&self, remote: &str, branch: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["push", "--no-verify", remote, "--delete", branch]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        let output = cmd
            .output()
            .context("Failed to execute git push --delete command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git push --delete failed: {}", stderr.trim());
        }

        Ok(())
    }
}
