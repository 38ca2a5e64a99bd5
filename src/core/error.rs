use thiserror::Error;

/// Fatal errors. These abort the current workflow or load and are shown in
/// full in the error view.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to load repository information: {0:#}")]
    Load(#[source] anyhow::Error),

    #[error("Failed to fetch '{remote}/{branch}': {source:#}")]
    Fetch {
        remote: String,
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Could not check '{base}' for divergence from '{upstream}': {source:#}")]
    DivergenceCheck {
        base: String,
        upstream: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "Local base branch '{base}' has {count} commit(s) not in '{upstream}' (diverged). Please resolve manually."
    )]
    Diverged {
        base: String,
        upstream: String,
        count: u32,
    },

    #[error("Failed to checkout '{branch}': {source:#}")]
    Checkout {
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to reset '{base}' to '{target}': {source:#}")]
    Reset {
        base: String,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to push '{branch}' to '{remote}': {source:#}")]
    PushBase {
        remote: String,
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Could not inspect the working tree: {0:#}")]
    Status(#[source] anyhow::Error),

    #[error("Failed to stash uncommitted changes: {0:#}")]
    Stash(#[source] anyhow::Error),

    #[error("Failed to restore stashed changes (run 'git stash pop' manually): {0:#}")]
    StashPop(#[source] anyhow::Error),
}

/// Why one queue item failed. Recorded, never fatal to the rest of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The one-time base update failed; the queue was abandoned here.
    #[error("base branch update failed")]
    BaseUpdateFailed,

    #[error("checkout failed: {0}")]
    CheckoutFailed(String),

    /// Rebase stopped on a conflict and was aborted.
    #[error("rebase conflict")]
    Conflict(String),

    #[error("push failed")]
    PushFailed(String),

    #[error("local delete failed: {0}")]
    DeleteLocalFailed(String),

    #[error("remote delete failed: {0}")]
    DeleteRemoteFailed(String),
}

impl FailureReason {
    /// Raw git output behind the failure, when there is any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::BaseUpdateFailed => None,
            Self::CheckoutFailed(d)
            | Self::Conflict(d)
            | Self::PushFailed(d)
            | Self::DeleteLocalFailed(d)
            | Self::DeleteRemoteFailed(d) => Some(d),
        }
    }
}

/// A failed queue item and its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub branch: String,
    pub reason: FailureReason,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.branch, self.reason)
    }
}
