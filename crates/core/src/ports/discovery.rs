use crate::domain::repo::RepoPath;
use anyhow::Result;
use std::path::PathBuf;

/// Request for repository discovery
#[derive(Clone, Debug)]
pub struct DiscoverReq {
    pub base: PathBuf,
}

/// Port for repository discovery
pub trait DiscoveryPort: Send + Sync {
    /// Find the working copies at `req.base` and its immediate children,
    /// sorted by path.
    /// This is blocking - caller should run in spawn_blocking
    fn scan(&self, req: DiscoverReq) -> Result<Vec<RepoPath>>;
}
