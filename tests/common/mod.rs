//! Throwaway repositories for integration tests.
//!
//! Layout under one temp dir:
//!   upstream.git  bare, owns `main`
//!   origin.git    bare, the user's fork
//!   work/         clone with both remotes, where gitsync runs

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Variables a parent git process (e.g. a hook) may leak into tests.
const GIT_ENV_VARS: &[&str] = &[
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_OBJECT_DIRECTORY",
    "GIT_ALTERNATE_OBJECT_DIRECTORIES",
    "GIT_COMMON_DIR",
    "GIT_CEILING_DIRECTORIES",
];

pub fn git_cmd() -> Command {
    let mut cmd = Command::new("git");
    for var in GIT_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Run git in `dir`, panicking with stderr on failure. Returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = git_cmd().current_dir(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
    pub work: PathBuf,
    pub upstream: PathBuf,
    pub origin: PathBuf,
}

impl Fixture {
    /// `main` with one commit, pushed to both remotes.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let upstream = root.join("upstream.git");
        let origin = root.join("origin.git");
        let work = root.join("work");

        for bare in [&upstream, &origin] {
            git(&root, &["init", "--bare", "-b", "main", bare.to_str().unwrap()]);
        }
        std::fs::create_dir(&work).unwrap();
        git(&work, &["init", "-b", "main"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["remote", "add", "upstream", upstream.to_str().unwrap()]);
        git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);

        let fixture = Self {
            _dir: dir,
            root,
            work,
            upstream,
            origin,
        };
        fixture.commit("shared.txt", "one\ntwo\nthree\n", "Initial commit");
        git(&fixture.work, &["push", "upstream", "main"]);
        git(&fixture.work, &["push", "origin", "main"]);
        fixture
    }

    pub fn commit(&self, file: &str, contents: &str, message: &str) {
        std::fs::write(self.work.join(file), contents).unwrap();
        git(&self.work, &["add", file]);
        git(&self.work, &["commit", "-m", message]);
    }

    /// Branch off the current `main`, commit one file and push to origin.
    pub fn feature(&self, name: &str, file: &str, contents: &str) {
        git(&self.work, &["checkout", "-b", name, "main"]);
        self.commit(file, contents, &format!("Work on {name}"));
        git(&self.work, &["push", "origin", name]);
        git(&self.work, &["checkout", "main"]);
    }

    /// Land a commit on upstream `main` while leaving local `main` behind.
    pub fn advance_upstream(&self, file: &str, contents: &str) {
        git(&self.work, &["checkout", "main"]);
        self.commit(file, contents, "Upstream change");
        git(&self.work, &["push", "upstream", "main"]);
        git(&self.work, &["reset", "--hard", "HEAD~1"]);
    }

    pub fn rev(&self, rev: &str) -> String {
        git(&self.work, &["rev-parse", rev])
    }

    /// Tip of `branch` in a bare remote.
    pub fn remote_rev(&self, remote: &Path, branch: &str) -> String {
        git(remote, &["rev-parse", &format!("refs/heads/{branch}")])
    }

    pub fn remote_has_branch(&self, remote: &Path, branch: &str) -> bool {
        git_cmd()
            .current_dir(remote)
            .args(["show-ref", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .status()
            .unwrap()
            .success()
    }
}
