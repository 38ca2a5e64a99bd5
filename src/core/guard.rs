//! Divergence and fetch guard for the base branch.
//!
//! Runs once at the start of an update workflow. The hard reset below would
//! silently throw away commits that exist only on the local base, so the
//! divergence check must pass before the base is touched.

use super::{ProgressSink, RepoOps, SyncError};
use crate::config::SyncConfig;
use tracing::info;

/// Fetch the upstream base, refuse to continue if the local base has
/// commits upstream lacks, then reset the local base to upstream and
/// lease-push it to origin.
pub fn prepare_base(
    repo: &dyn RepoOps,
    config: &SyncConfig,
    progress: &mut dyn ProgressSink,
) -> Result<(), SyncError> {
    let base = config.base_branch.as_str();
    let upstream = config.upstream_remote.as_str();
    let upstream_ref = config.upstream_ref();

    progress.on_step(&format!("Fetching {upstream_ref}"));
    repo.fetch(upstream, base).map_err(|source| SyncError::Fetch {
        remote: upstream.to_string(),
        branch: base.to_string(),
        source,
    })?;

    let local_only = repo
        .count_local_only(base, &upstream_ref)
        .map_err(|source| SyncError::DivergenceCheck {
            base: base.to_string(),
            upstream: upstream_ref.clone(),
            source,
        })?;
    if local_only > 0 {
        return Err(SyncError::Diverged {
            base: base.to_string(),
            upstream: upstream_ref,
            count: local_only,
        });
    }

    progress.on_step(&format!("Resetting {base} to {upstream_ref}"));
    repo.checkout(base).map_err(|source| SyncError::Checkout {
        branch: base.to_string(),
        source,
    })?;
    repo.reset_hard(&upstream_ref)
        .map_err(|source| SyncError::Reset {
            base: base.to_string(),
            target: upstream_ref.clone(),
            source,
        })?;

    let origin = config.origin_remote.as_str();
    progress.on_step(&format!("Pushing {base} to {origin}"));
    repo.push_with_lease(origin, base)
        .map_err(|source| SyncError::PushBase {
            remote: origin.to_string(),
            branch: base.to_string(),
            source,
        })?;

    info!(base, upstream = %upstream_ref, "base branch updated");
    Ok(())
}
