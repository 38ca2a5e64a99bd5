use super::{parse_left_right, GitCommand};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;

impl GitCommand {
    pub fn rev_parse_is_inside_work_tree(&self) -> Result<bool> {
        let status = self
            .command()
            .args(["rev-parse", "--is-inside-work-tree"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context("Failed to check if inside Git repository")?;

        Ok(status.success())
    }

    /// Top level of the working tree.
    pub fn show_toplevel(&self) -> Result<PathBuf> {
        let output = self.run(&["rev-parse", "--show-toplevel"], "rev-parse")?;
        Ok(PathBuf::from(output.trim()))
    }

    /// The repository's git directory, resolved to an absolute path.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let output = self.run(&["rev-parse", "--absolute-git-dir"], "rev-parse")?;
        Ok(PathBuf::from(output.trim()))
    }

    /// Count commits in a revision range such as `upstream/main..main`.
    pub fn rev_list_count(&self, range: &str) -> Result<u32> {
        let output = self.run(&["rev-list", "--count", range, "--"], "rev-list")?;
        output
            .trim()
            .parse()
            .with_context(|| format!("Invalid commit count '{}'", output.trim()))
    }

    /// Symmetric count `base...branch`: `(behind, ahead)` of `branch` relative to `base`.
    pub fn rev_list_left_right(&self, base: &str, branch: &str) -> Result<(u32, u32)> {
        let range = format!("{base}...{branch}");
        let output = self.run(
            &["rev-list", "--left-right", "--count", &range, "--"],
            "rev-list",
        )?;
        parse_left_right(&output)
    }
}
