use crate::context::SyncContext;
use crate::services::{probes, safety};
use reposync_core::domain::{RepoPath, UpdateOptions, UpdateResult};
use reposync_core::error::Result;
use reposync_core::ports::{GitCommand, GitPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NO_UPSTREAM_MESSAGE: &str = "no upstream configured";

/// Brings one repository up to date with its remote, refusing whenever the
/// working copy holds work a rebase could lose.
///
/// Fetch, then check safety and upstream concurrently, then pull and
/// optionally update submodules. In dry-run nothing mutating is executed, but
/// every command that would run is still recorded.
pub struct UpdateService {
    git: Arc<dyn GitPort>,
}

impl UpdateService {
    pub fn new(git: Arc<dyn GitPort>) -> Self {
        Self { git }
    }

    pub async fn update(
        &self,
        ctx: &SyncContext,
        repo: &RepoPath,
        opts: &UpdateOptions,
    ) -> Result<UpdateResult> {
        let git = self.git.as_ref();
        let mut result = UpdateResult::new(repo.clone());

        // Without fresh remote refs the checks below would judge stale state
        let mut fetch = GitCommand::new(repo.as_path(), ["fetch", "--all"]);
        if opts.prune {
            fetch = fetch.arg("--prune");
        }
        result.commands.push(fetch.to_string());
        if !opts.dry_run {
            probes::exec(git, ctx, "fetch", &fetch).await?;
        }

        let (unsafe_state, upstream) = tokio::join!(
            safety::detect_unsafe_state(git, ctx, repo),
            probes::upstream_state(git, ctx, repo),
        );

        let unsafe_messages = match unsafe_state {
            Ok(messages) => messages,
            Err(e) if opts.dry_run => {
                warn!("{}: could not determine repository state: {}", repo, e);
                result
                    .skipped_messages
                    .push(format!("could not determine repository state: {}", e));
                return Ok(result);
            }
            Err(e) => return Err(e),
        };

        let upstream_failure = match upstream {
            Ok(state) => {
                result.upstream_checked = true;
                result.has_upstream = state.has_upstream();
                None
            }
            Err(e) if opts.dry_run => Some(format!("could not determine upstream: {}", e)),
            Err(e) => return Err(e),
        };

        if !unsafe_messages.is_empty() {
            info!("{}: skipped, {}", repo, unsafe_messages.join("; "));
            result.skipped_messages.extend(unsafe_messages);
            result.skipped_messages.extend(upstream_failure);
            return Ok(result);
        }
        result.skipped_messages.extend(upstream_failure);

        let mut pull = GitCommand::new(repo.as_path(), ["pull", "--rebase"]);
        if opts.autostash {
            pull = pull.arg("--autostash");
        }
        match (opts.dry_run, result.upstream_checked, result.has_upstream) {
            (true, true, true) => result.commands.push(pull.to_string()),
            (true, true, false) => result.skipped_messages.push(NO_UPSTREAM_MESSAGE.to_string()),
            // Already reported as an upstream failure
            (true, false, _) => {}
            (false, _, true) => {
                result.commands.push(pull.to_string());
                probes::exec(git, ctx, "pull", &pull).await?;
            }
            (false, _, false) => {
                debug!("{}: no upstream, not pulling", repo);
                result.skipped_messages.push(NO_UPSTREAM_MESSAGE.to_string());
            }
        }

        if opts.submodule_update {
            let submodules = GitCommand::new(
                repo.as_path(),
                ["submodule", "update", "--init", "--recursive", "--remote"],
            );
            result.commands.push(submodules.to_string());
            if !opts.dry_run {
                probes::exec(git, ctx, "submodule update", &submodules).await?;
            }
        }

        Ok(result)
    }
}
