use super::{output_lines, GitCommand};
use anyhow::{Context, Result};

impl GitCommand {
    /// All local branch names, sorted by refname.
    pub fn branch_list(&self) -> Result<Vec<String>> {
        let output = self.run(
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
            "for-each-ref",
        )?;
        Ok(output_lines(&output))
    }

    /// The checked-out branch, or `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let output = self.run(&["branch", "--show-current"], "branch --show-current")?;
        let branch = output.trim();
        if branch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(branch.to_string()))
        }
    }

    /// Safe delete (`git branch -d`); refuses branches with unmerged commits.
    pub fn branch_delete(&self, branch: &str) -> Result<()> {
        let output = self
            .command()
            .args(["branch", "-d", branch])
            .output()
            .context("Failed to execute git branch command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git branch delete failed: {}", stderr.trim());
        }

        Ok(())
    }

    /// Checkout a branch in the working directory.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["checkout"]);

        if self.quiet {
            cmd.arg("--quiet");
        }

        cmd.arg(branch);

        let output = cmd
            .output()
            .context("Failed to execute git checkout command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git checkout failed: {}", stderr.trim());
        }

        Ok(())
    }

    /// Human-relative age of the branch tip ("2 days ago").
    pub fn last_commit_relative(&self, branch: &str) -> Result<String> {
        let output = self.run(&["log", "-1", "--format=%ar", branch, "--"], "log")?;
        Ok(output.trim().to_string())
    }

    /// Rebase the checked-out branch onto `onto`. Leaves the rebase in
    /// progress on failure; callers must follow up with `rebase_abort`.
    pub fn rebase(&self, onto: &str) -> Result<String> {
        let output = self
            .command()
            .args(["rebase", onto])
            .output()
            .context("Failed to execute git rebase command")?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git rebase failed: {}\n{}", stdout.trim(), stderr.trim());
        }

        String::from_utf8(output.stdout).context("Failed to parse git rebase output")
    }

    pub fn rebase_abort(&self) -> Result<()> {
        self.run(&["rebase", "--abort"], "rebase --abort")?;
        Ok(())
    }
}
