use crate::context::SyncContext;
use anyhow::Context;
use reposync_core::domain::{classify, RepoPath, Status};
use reposync_core::error::Result;
use reposync_core::ports::StatusPort;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Classifies repositories for reporting. Never mutates anything.
pub struct StatusService {
    status_port: Arc<dyn StatusPort>,
}

impl StatusService {
    pub fn new(status_port: Arc<dyn StatusPort>) -> Self {
        Self { status_port }
    }

    pub async fn status(&self, ctx: &SyncContext, repo: &RepoPath) -> Result<Status> {
        let status_port = self.status_port.clone();
        let repo_clone = repo.clone();

        let facts = ctx
            .run("status", tokio::task::spawn_blocking(move || status_port.facts(&repo_clone)))
            .await?
            .context("Status task failed")??;

        debug!("{}: {:?}", repo, facts);
        Ok(classify(facts.dirty, facts.has_upstream, facts.ahead))
    }

    /// Status of every repository, at most `jobs` at a time, in input order
    pub async fn report(
        self: &Arc<Self>,
        ctx: &SyncContext,
        repos: &[RepoPath],
        jobs: usize,
    ) -> Vec<(RepoPath, Result<Status>)> {
        let permits = Arc::new(Semaphore::new(jobs.max(1)));
        let mut tasks = JoinSet::new();

        for (index, repo) in repos.iter().cloned().enumerate() {
            let service = Arc::clone(self);
            let ctx = ctx.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let status = service.status(&ctx, &repo).await;
                (index, repo, status)
            });
        }

        let mut results = Vec::with_capacity(repos.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => error!("Status task panicked: {}", e),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, repo, status)| (repo, status))
            .collect()
    }
}
