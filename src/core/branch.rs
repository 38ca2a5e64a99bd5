/// Where a branch stands relative to the base, or what the last workflow did to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchStatus {
    /// Contains everything on the base branch.
    Ok,
    /// Missing commits from the base branch.
    Behind,
    /// Known to conflict with the base. Workflows never assign it: a conflicting
    /// rebase is reported as a failure and the branch keeps its status.
    Conflict,
    /// Rebased and pushed by the last update workflow.
    Updated,
    /// Removed locally and remotely by the last delete workflow.
    Deleted,
}

impl BranchStatus {
    /// Initial status derived from the behind count at load time.
    pub fn from_behind(behind: u32) -> Self {
        if behind > 0 {
            Self::Behind
        } else {
            Self::Ok
        }
    }
}

/// Which pipeline a workflow runs over its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Rebase onto the base branch and push.
    Update,
    /// Delete locally and on the origin remote.
    Delete,
}

impl SyncMode {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Status a branch takes when this mode succeeds on it.
    pub fn success_status(self) -> BranchStatus {
        match self {
            Self::Update => BranchStatus::Updated,
            Self::Delete => BranchStatus::Deleted,
        }
    }
}

/// One local branch under management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    /// Free-text tag; empty means untagged.
    pub description: String,
    pub ahead: u32,
    pub behind: u32,
    /// Display only ("2 days ago").
    pub last_commit: String,
    pub selected: bool,
    pub status: BranchStatus,
}

impl Branch {
    pub fn new(name: impl Into<String>, behind: u32, ahead: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ahead,
            behind,
            last_commit: String::new(),
            selected: false,
            status: BranchStatus::from_behind(behind),
        }
    }

    /// Case-insensitive substring match on name or description.
    /// `query_lower` must already be lowercased.
    pub fn matches(&self, query_lower: &str) -> bool {
        query_lower.is_empty()
            || self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
    }
}
