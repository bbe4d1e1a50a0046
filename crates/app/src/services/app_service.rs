use crate::context::SyncContext;
use crate::services::status_service::StatusService;
use crate::services::update_service::UpdateService;
use anyhow::{Context, Result};
use reposync_core::domain::{RepoPath, Status, UpdateOptions, UpdateResult};
use reposync_core::error::Result as CoreResult;
use reposync_core::ports::{DiscoverReq, DiscoveryPort, GitPort, StatusPort};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Coordinates discovery, status reporting and updates across many
/// repositories. Each repository gets exactly one task, so no two updates
/// ever touch the same working copy at once.
pub struct AppService {
    // Ports (dependency injection)
    discovery_port: Arc<dyn DiscoveryPort>,

    update_service: Arc<UpdateService>,
    status_service: Arc<StatusService>,

    jobs: usize,
    timeout: Option<Duration>,
}

impl AppService {
    pub fn new(
        git_port: Arc<dyn GitPort>,
        discovery_port: Arc<dyn DiscoveryPort>,
        status_port: Arc<dyn StatusPort>,
    ) -> Self {
        Self {
            discovery_port,
            update_service: Arc::new(UpdateService::new(git_port)),
            status_service: Arc::new(StatusService::new(status_port)),
            jobs: 8,
            timeout: None,
        }
    }

    /// Maximum number of repositories processed at the same time
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Deadline applied to each repository's update
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Discover repositories at `base` and its immediate children
    pub async fn discover(&self, base: PathBuf) -> Result<Vec<RepoPath>> {
        info!("Discovering repositories in {}", base.display());
        let discovery_port = self.discovery_port.clone();

        // Run discovery in spawn_blocking since it touches the filesystem
        let repos = tokio::task::spawn_blocking(move || {
            let req = DiscoverReq { base };
            discovery_port.scan(req)
        })
        .await
        .context("Discovery task failed")??;

        info!("Discovery found {} repositories", repos.len());
        Ok(repos)
    }

    pub async fn status_all(
        &self,
        ctx: &SyncContext,
        repos: &[RepoPath],
    ) -> Vec<(RepoPath, CoreResult<Status>)> {
        self.status_service.report(ctx, repos, self.jobs).await
    }

    /// Update every repository, at most `jobs` at a time. Results come back
    /// in input order; one repository failing never stops the others.
    pub async fn update_all(
        &self,
        ctx: &SyncContext,
        repos: &[RepoPath],
        opts: UpdateOptions,
    ) -> Vec<(RepoPath, CoreResult<UpdateResult>)> {
        let permits = Arc::new(Semaphore::new(self.jobs));
        let mut tasks = JoinSet::new();

        for (index, repo) in repos.iter().cloned().enumerate() {
            let update_service = self.update_service.clone();
            let permits = permits.clone();
            let ctx = ctx.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                // The deadline starts once the repository gets a slot
                let ctx = match timeout {
                    Some(timeout) => ctx.with_timeout(timeout),
                    None => ctx,
                };
                let result = update_service.update(&ctx, &repo, &opts).await;
                match &result {
                    Ok(update) if update.is_skipped() => {
                        info!("{}: skipped", repo);
                    }
                    Ok(_) => info!("{}: updated", repo),
                    Err(e) => warn!("{}: update failed: {}", repo, e),
                }
                (index, repo, result)
            });
        }

        let mut results = Vec::with_capacity(repos.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => error!("Update task panicked: {}", e),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, repo, result)| (repo, result))
            .collect()
    }
}
