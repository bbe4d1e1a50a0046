//! Read-only git queries. Each one is a single git invocation bound to the
//! caller's context.

use crate::context::SyncContext;
use reposync_core::domain::{RepoPath, UpstreamState};
use reposync_core::error::{CoreError, Result};
use reposync_core::ports::{GitCommand, GitOutput, GitPort};

/// Output shapes of `rev-parse @{u}` that mean "nothing is tracked" rather
/// than a broken repository
const NO_UPSTREAM_MARKERS: &[&str] = &[
    "no upstream configured",
    "does not point to a branch",
    "no such branch",
];

const REMOTES_PREFIX: &str = "refs/remotes/";

/// Run `cmd` under `ctx`, turning a non-zero exit into `CommandFailed`
pub(crate) async fn exec(
    git: &dyn GitPort,
    ctx: &SyncContext,
    step: &str,
    cmd: &GitCommand,
) -> Result<GitOutput> {
    let out = ctx.run(step, git.run(cmd)).await??;
    if !out.success {
        return Err(CoreError::CommandFailed {
            step: step.to_string(),
            command: cmd.to_string(),
            output: out.combined(),
        });
    }
    Ok(out)
}

pub async fn is_dirty(git: &dyn GitPort, ctx: &SyncContext, repo: &RepoPath) -> Result<bool> {
    let cmd = GitCommand::new(repo.as_path(), ["status", "--porcelain"]);
    let out = exec(git, ctx, "dirty check", &cmd).await?;
    Ok(!out.text().is_empty())
}

pub async fn has_stash(git: &dyn GitPort, ctx: &SyncContext, repo: &RepoPath) -> Result<bool> {
    let cmd = GitCommand::new(repo.as_path(), ["stash", "list"]);
    let out = exec(git, ctx, "stash check", &cmd).await?;
    Ok(!out.text().is_empty())
}

/// Current branch name, or `None` when HEAD is detached
pub async fn head_branch(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
) -> Result<Option<String>> {
    let cmd = GitCommand::new(repo.as_path(), ["rev-parse", "--abbrev-ref", "HEAD"]);
    let out = exec(git, ctx, "HEAD check", &cmd).await?;
    match out.text() {
        "HEAD" => Ok(None),
        branch => Ok(Some(branch.to_string())),
    }
}

/// Upstream of the current branch in `remote/branch` form, `None` if untracked
pub async fn upstream_ref(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
) -> Result<Option<String>> {
    let cmd = GitCommand::new(
        repo.as_path(),
        ["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
    );
    let out = ctx.run("upstream lookup", git.run(&cmd)).await??;

    if out.success {
        let upstream = out.text();
        return Ok((!upstream.is_empty()).then(|| upstream.to_string()));
    }

    let output = out.combined();
    let lowered = output.to_lowercase();
    if NO_UPSTREAM_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Ok(None);
    }

    Err(CoreError::CommandFailed {
        step: "upstream lookup".to_string(),
        command: cmd.to_string(),
        output,
    })
}

/// Default branch recorded for `remote`, as `remote/branch`
pub async fn remote_default_branch(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
    remote: &str,
) -> Result<String> {
    let cmd = GitCommand::new(
        repo.as_path(),
        [
            "symbolic-ref".to_string(),
            "--quiet".to_string(),
            format!("{REMOTES_PREFIX}{remote}/HEAD"),
        ],
    );
    let out = exec(git, ctx, "remote default branch lookup", &cmd).await?;

    match out.text().strip_prefix(REMOTES_PREFIX) {
        Some(short) if !short.is_empty() => Ok(short.to_string()),
        _ => Err(CoreError::CommandFailed {
            step: "remote default branch lookup".to_string(),
            command: cmd.to_string(),
            output: format!("unexpected output '{}'", out.text()),
        }),
    }
}

/// Commits on HEAD that are not on its upstream
pub async fn ahead_count(git: &dyn GitPort, ctx: &SyncContext, repo: &RepoPath) -> Result<i64> {
    let cmd = GitCommand::new(repo.as_path(), ["rev-list", "--count", "@{u}..HEAD"]);
    let out = exec(git, ctx, "ahead count", &cmd).await?;
    out.text()
        .parse::<i64>()
        .map_err(|e| CoreError::CommandFailed {
            step: "ahead count".to_string(),
            command: cmd.to_string(),
            output: format!("'{}': {}", out.text(), e),
        })
}

/// Upstream presence and, when present, how far HEAD is ahead of it
pub async fn upstream_state(
    git: &dyn GitPort,
    ctx: &SyncContext,
    repo: &RepoPath,
) -> Result<UpstreamState> {
    let Some(upstream) = upstream_ref(git, ctx, repo).await? else {
        return Ok(UpstreamState::default());
    };
    let ahead = ahead_count(git, ctx, repo).await?;
    Ok(UpstreamState {
        upstream: Some(upstream),
        ahead,
    })
}

/// Remote name of a `remote/branch` ref
pub fn remote_of(upstream: &str) -> &str {
    upstream.split_once('/').map_or(upstream, |(remote, _)| remote)
}
