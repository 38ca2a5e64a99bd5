//! Branch info collection relative to the base branch.

use super::{Branch, RepoOps};
use anyhow::Result;
use tracing::{debug, warn};

/// Branches collected for display, plus how many were dropped because
/// their info query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub branches: Vec<Branch>,
    pub skipped: usize,
}

/// Whether `name` is left out of management: the base itself, or any
/// name containing one of `patterns` as a substring.
pub fn is_excluded(name: &str, base: &str, patterns: &[String]) -> bool {
    name == base
        || patterns
            .iter()
            .any(|p| !p.is_empty() && name.contains(p.as_str()))
}

/// Enumerate local branches and compute ahead/behind and last-commit age
/// against `base` for each one that is not excluded.
///
/// Listing failures are errors. A single branch whose info query fails is
/// skipped and counted in [`Collection::skipped`].
pub fn collect(repo: &dyn RepoOps, base: &str, exclude_patterns: &[String]) -> Result<Collection> {
    let names = repo.list_local_branches()?;
    let mut collection = Collection::default();

    for name in names {
        if is_excluded(&name, base, exclude_patterns) {
            debug!(branch = %name, "excluded");
            continue;
        }

        match branch_info(repo, &name, base) {
            Ok(branch) => collection.branches.push(branch),
            Err(e) => {
                warn!(branch = %name, "skipping branch: {e:#}");
                collection.skipped += 1;
            }
        }
    }

    Ok(collection)
}

fn branch_info(repo: &dyn RepoOps, name: &str, base: &str) -> Result<Branch> {
    let (behind, ahead) = repo.ahead_behind(base, name)?;
    let mut branch = Branch::new(name, behind, ahead);
    branch.last_commit = repo.last_commit_relative(name)?;
    // A missing or unreadable description just means untagged.
    branch.description = repo
        .branch_description(name)
        .ok()
        .flatten()
        .unwrap_or_default();
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake::FakeRepo;
    use crate::core::BranchStatus;

    fn names(collection: &Collection) -> Vec<&str> {
        collection.branches.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_is_excluded() {
        let patterns = vec!["release/".to_string(), "wip".to_string()];
        assert!(is_excluded("main", "main", &patterns));
        assert!(is_excluded("release/1.0", "main", &patterns));
        assert!(is_excluded("feature-wip-2", "main", &patterns));
        assert!(!is_excluded("feature-x", "main", &patterns));
        assert!(!is_excluded("feature-x", "main", &["".to_string()]));
    }

    #[test]
    fn test_collect_drops_base_and_excluded() {
        let repo = FakeRepo::new(&["main", "release/1.0", "feature-x"]);
        let collection = collect(&repo, "main", &["release/".to_string()]).unwrap();
        assert_eq!(names(&collection), vec!["feature-x"]);
        assert_eq!(collection.skipped, 0);
    }

    #[test]
    fn test_collect_computes_counts_and_status() {
        let repo = FakeRepo::new(&["main", "feature-a", "feature-b"])
            .with_counts("feature-a", 2, 1)
            .with_counts("feature-b", 0, 4)
            .with_description("feature-b", "login page");

        let collection = collect(&repo, "main", &[]).unwrap();
        let a = &collection.branches[0];
        assert_eq!((a.behind, a.ahead), (2, 1));
        assert_eq!(a.status, BranchStatus::Behind);
        assert_eq!(a.description, "");

        let b = &collection.branches[1];
        assert_eq!((b.behind, b.ahead), (0, 4));
        assert_eq!(b.status, BranchStatus::Ok);
        assert_eq!(b.description, "login page");
        assert_eq!(b.last_commit, "2 days ago");
    }

    #[test]
    fn test_collect_skips_branch_whose_info_fails() {
        let repo = FakeRepo::new(&["main", "broken", "feature-a"]).with_broken_info("broken");
        let collection = collect(&repo, "main", &[]).unwrap();
        assert_eq!(names(&collection), vec!["feature-a"]);
        assert_eq!(collection.skipped, 1);
    }

    #[test]
    fn test_collect_propagates_listing_failure() {
        let repo = FakeRepo::new(&["main"]).with_failing("list");
        assert!(collect(&repo, "main", &[]).is_err());
    }
}
