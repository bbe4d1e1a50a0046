//! Decides whether a rebase-style update could lose local work.

use crate::context::SyncContext;
use crate::services::probes;
use reposync_core::domain::RepoPath;
use reposync_core::error::{CoreError, Result};
use reposync_core::ports::GitPort;
use tracing::debug;

pub const DIRTY_MESSAGE: &str =
    "working tree has uncommitted changes (tracked or untracked); commit or stash them first";
pub const STASH_MESSAGE: &str = "stash is not empty; apply or drop the stashed changes first";
pub const DETACHED_MESSAGE: &str = "HEAD is detached; check out a branch first";

/// Reasons an update of `repo` is unsafe right now; empty when it is safe.
///
/// The dirty, stash and HEAD probes run concurrently and are all awaited. If
/// any of them fails the error carries every failure. The default-branch
/// comparison only runs on a named branch and never fails: problems resolving
/// either ref become a reason instead.
pub async fn detect_unsafe_state(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
) -> Result<Vec<String>> {
    let (dirty, stash, head) = tokio::join!(
        probes::is_dirty(git, ctx, repo),
        probes::has_stash(git, ctx, repo),
        probes::head_branch(git, ctx, repo),
    );

    let (dirty, stash, head) = match (dirty, stash, head) {
        (Ok(dirty), Ok(stash), Ok(head)) => (dirty, stash, head),
        (dirty, stash, head) => {
            let failures: Vec<CoreError> = [dirty.err(), stash.err(), head.err()]
                .into_iter()
                .flatten()
                .collect();
            return Err(CoreError::StateProbe { failures });
        }
    };

    let mut messages = Vec::new();
    if dirty {
        messages.push(DIRTY_MESSAGE.to_string());
    }
    if stash {
        messages.push(STASH_MESSAGE.to_string());
    }

    match head {
        None => messages.push(DETACHED_MESSAGE.to_string()),
        Some(branch) => {
            if let Some(msg) = default_branch_divergence(git, ctx, repo, &branch).await {
                messages.push(msg);
            }
        }
    }

    debug!("{}: {} unsafe condition(s)", repo, messages.len());
    Ok(messages)
}

/// Compare the upstream of `branch` with the default branch of its remote
async fn default_branch_divergence(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
    branch: &str,
) -> Option<String> {
    let upstream = match probes::upstream_ref(git, ctx, repo).await {
        Ok(Some(upstream)) => upstream,
        Ok(None) => return None,
        Err(e) => {
            return Some(format!(
                "could not resolve the upstream of branch '{}': {}",
                branch, e
            ));
        }
    };

    let remote = probes::remote_of(&upstream);
    let default = match probes::remote_default_branch(git, ctx, repo, remote).await {
        Ok(default) => default,
        Err(e) => {
            return Some(format!(
                "could not resolve the default branch of remote '{}': {}; run `git remote set-head {} --auto`",
                remote, e, remote
            ));
        }
    };

    if default == upstream {
        return None;
    }

    Some(format!(
        "branch '{}' tracks '{}' but the default branch of '{}' is '{}'; switch to the default branch or update '{}' by hand",
        branch, upstream, remote, default, branch
    ))
}
