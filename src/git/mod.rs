use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

mod branch;
mod config;
mod provider;
mod refs;
mod remote;
mod stash;

/// Thin wrapper around the `git` binary.
///
/// Every method runs exactly one git subprocess and returns either the
/// parsed output or an error carrying git's stderr. Nothing here prompts.
#[derive(Debug, Clone)]
pub struct GitCommand {
    pub(crate) quiet: bool,
    pub(crate) work_dir: Option<PathBuf>,
}

impl GitCommand {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            work_dir: None,
        }
    }

    /// Pin every git invocation to `path` instead of the process working directory.
    pub fn in_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(path.into());
        self
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        // Never prompt: the TUI owns the terminal
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run `git <args>` and return stdout, bailing with stderr on a non-zero exit.
    pub(crate) fn run(&self, args: &[&str], what: &str) -> Result<String> {
        debug!(?args, "git");
        let output = self
            .command()
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute git {what} command"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git {what} failed: {}", stderr.trim());
        }

        String::from_utf8(output.stdout).with_context(|| format!("Failed to parse git {what} output"))
    }
}

/// Split command output into trimmed, non-empty lines.
pub(crate) fn output_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `git rev-list --left-right --count A...B` output into `(left, right)`.
pub(crate) fn parse_left_right(output: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = output.split_whitespace().collect();
    if parts.len() != 2 {
        anyhow::bail!("Unexpected rev-list output: '{}'", output.trim());
    }
    let left = parts[0]
        .parse()
        .with_context(|| format!("Invalid commit count '{}'", parts[0]))?;
    let right = parts[1]
        .parse()
        .with_context(|| format!("Invalid commit count '{}'", parts[1]))?;
    Ok((left, right))
}

/// Extract the branch from the `HEAD branch:` line of `git remote show <remote>`.
pub(crate) fn parse_remote_head(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("HEAD branch:"))
        .map(str::trim)
        .filter(|branch| !branch.is_empty() && *branch != "(unknown)")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_command_new() {
        let git = GitCommand::new(true);
        assert!(git.quiet);
        assert!(git.work_dir().is_none());

        let git = GitCommand::new(false).in_dir("/tmp/repo");
        assert!(!git.quiet);
        assert_eq!(git.work_dir(), Some(Path::new("/tmp/repo")));
    }

    #[test]
    fn test_output_lines_skips_blanks() {
        let lines = output_lines("main\n\n  feature-a \nfeature-b\n");
        assert_eq!(lines, vec!["main", "feature-a", "feature-b"]);
    }

    #[test]
    fn test_parse_left_right() {
        assert_eq!(parse_left_right("2\t5\n").unwrap(), (2, 5));
        assert_eq!(parse_left_right("0 0").unwrap(), (0, 0));
        assert!(parse_left_right("").is_err());
        assert!(parse_left_right("x 1").is_err());
    }

    #[test]
    fn test_parse_remote_head() {
        let output = "* remote upstream\n  Fetch URL: git@example.com:org/repo.git\n  HEAD branch: develop\n  Remote branches:\n";
        assert_eq!(parse_remote_head(output), Some("develop".to_string()));
        assert_eq!(parse_remote_head("  HEAD branch: (unknown)\n"), None);
        assert_eq!(parse_remote_head("* remote origin\n"), None);
    }
}
