use anyhow::Result;
use which::which;

pub mod commands;
pub mod config;
pub mod core;
pub mod git;
pub mod logging;
pub mod session;
pub mod styles;
pub mod tui;

/// Version string shown by `--version`; carries the commit hash on dev builds.
pub const VERSION: &str = env!("GITSYNC_VERSION");

/// Whether the process working directory is inside a git work tree.
pub fn is_git_repository() -> Result<bool> {
    git::GitCommand::new(true).rev_parse_is_inside_work_tree()
}

pub fn check_dependencies() -> Result<()> {
    let missing: Vec<&str> = ["git"]
        .into_iter()
        .filter(|tool| which(tool).is_err())
        .collect();

    if !missing.is_empty() {
        anyhow::bail!("Missing required dependencies: {}", missing.join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_check_dependencies_finds_git() {
        check_dependencies().unwrap();
    }
}
