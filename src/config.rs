//! Sync configuration: `.gitsync.yaml` overrides on top of auto-detection.
//!
//! ```yaml
//! base_branch: main
//! upstream_remote: upstream
//! origin_remote: origin
//! exclude_patterns:
//!   - release/
//! ```
//!
//! Every field is optional. Anything the file leaves out is detected from
//! the repository.

use crate::core::RepoOps;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file name looked up at the repository top level.
pub const CONFIG_FILE: &str = ".gitsync.yaml";

/// Base branch names tried, in order, when the upstream does not advertise one.
const BASE_CANDIDATES: &[&str] = &["main", "master", "dev-integration", "develop"];

const DEFAULT_ORIGIN: &str = "origin";

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_branch: String,
    pub upstream_remote: String,
    pub origin_remote: String,
    /// Substrings; a branch whose name contains any of them is not managed.
    pub exclude_patterns: Vec<String>,
}

impl SyncConfig {
    pub fn new(
        base_branch: impl Into<String>,
        upstream_remote: impl Into<String>,
        origin_remote: impl Into<String>,
    ) -> Self {
        Self {
            base_branch: base_branch.into(),
            upstream_remote: upstream_remote.into(),
            origin_remote: origin_remote.into(),
            exclude_patterns: Vec::new(),
        }
    }

    /// `<upstream>/<base>`, the ref the base is reset to.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.upstream_remote, self.base_branch)
    }

    /// Resolve the configuration: file values first, detection for the rest.
    pub fn load(repo: &dyn RepoOps, location: &ConfigLocation) -> Result<Self> {
        let file = location.read()?.unwrap_or_default();

        let upstream_remote = match file.upstream_remote {
            Some(remote) => remote,
            None => detect_upstream_remote(&repo.list_remotes()?)?,
        };
        let base_branch = match file.base_branch {
            Some(base) => base,
            None => detect_base_branch(repo, &upstream_remote)?,
        };
        let origin_remote = file
            .origin_remote
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        let config = Self {
            base_branch,
            upstream_remote,
            origin_remote,
            exclude_patterns: file.exclude_patterns.unwrap_or_default(),
        };
        debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Write every field to `path` as YAML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = ConfigFile {
            base_branch: Some(self.base_branch.clone()),
            upstream_remote: Some(self.upstream_remote.clone()),
            origin_remote: Some(self.origin_remote.clone()),
            exclude_patterns: Some(self.exclude_patterns.clone()),
        };
        let yaml = serde_yaml::to_string(&file).context("Failed to serialize configuration")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

/// Where the config file is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Passed with `--config`; must exist.
    Explicit(PathBuf),
    /// `.gitsync.yaml` at the top level; may be absent.
    Default(PathBuf),
}

impl ConfigLocation {
    pub fn resolve(explicit: Option<PathBuf>, toplevel: &Path) -> Self {
        match explicit {
            Some(path) => Self::Explicit(path),
            None => Self::Default(toplevel.join(CONFIG_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Default(p) => p,
        }
    }

    fn read(&self) -> Result<Option<ConfigFile>> {
        let path = self.path();
        if let Self::Default(_) = self {
            if !path.is_file() {
                debug!(path = %path.display(), "no config file, using detection");
                return Ok(None);
            }
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Some(file))
    }
}

/// On-disk shape; all fields optional.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_remote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin_remote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_patterns: Option<Vec<String>>,
}

/// Prefer a remote named `upstream`, then `origin`.
pub fn detect_upstream_remote(remotes: &[String]) -> Result<String> {
    for preferred in ["upstream", DEFAULT_ORIGIN] {
        if remotes.iter().any(|r| r == preferred) {
            return Ok(preferred.to_string());
        }
    }
    bail!("no remotes found (expected a remote named 'upstream' or 'origin')")
}

/// The upstream's HEAD branch, else the first candidate name that exists
/// locally, else the first local branch by name.
pub fn detect_base_branch(repo: &dyn RepoOps, upstream: &str) -> Result<String> {
    match repo.remote_head_branch(upstream) {
        Ok(Some(head)) => return Ok(head),
        Ok(None) => {}
        Err(e) => warn!(remote = upstream, "could not inspect remote HEAD: {e:#}"),
    }

    let mut local = repo.list_local_branches()?;
    if let Some(candidate) = BASE_CANDIDATES
        .iter()
        .find(|c| local.iter().any(|b| b == *c))
    {
        return Ok(candidate.to_string());
    }

    local.sort();
    local
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no branches found"))
}
