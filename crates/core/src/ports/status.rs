use crate::domain::repo::{RepoFacts, RepoPath};
use anyhow::Result;

/// Port for reading the facts the status classifier needs
pub trait StatusPort: Send + Sync {
    /// This is blocking - caller should run in spawn_blocking
    fn facts(&self, repo: &RepoPath) -> Result<RepoFacts>;
}
