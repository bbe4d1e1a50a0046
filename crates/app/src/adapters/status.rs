use anyhow::{Context, Result};
use git2::{Repository as GitRepository, StatusOptions};
use reposync_core::domain::{RepoFacts, RepoPath};
use reposync_core::ports::StatusPort;

/// Status adapter that implements StatusPort using git2
pub struct Git2StatusAdapter;

impl Git2StatusAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Commits on HEAD not on its upstream, or `None` when the current branch
    /// has no resolvable upstream (unborn, detached, or untracked branch).
    fn ahead_of_upstream(git_repo: &GitRepository) -> Result<Option<i64>> {
        let head = match git_repo.head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        if !head.is_branch() {
            return Ok(None);
        }

        let (Some(local_oid), Some(ref_name)) = (head.target(), head.name()) else {
            return Ok(None);
        };
        let upstream_ref = match git_repo.branch_upstream_name(ref_name) {
            Ok(buf) => buf,
            Err(_) => return Ok(None),
        };
        let Some(upstream_str) = upstream_ref.as_str() else {
            return Ok(None);
        };
        let upstream_oid = match git_repo.refname_to_id(upstream_str) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let (ahead, _behind) = git_repo
            .graph_ahead_behind(local_oid, upstream_oid)
            .context("Failed to calculate ahead/behind counts")?;

        Ok(Some(ahead as i64))
    }
}

impl StatusPort for Git2StatusAdapter {
    fn facts(&self, repo: &RepoPath) -> Result<RepoFacts> {
        let git_repo = GitRepository::open(repo.as_path())
            .with_context(|| format!("Failed to open git repository at {}", repo))?;

        // Check working directory status
        let mut status_options = StatusOptions::new();
        status_options.include_untracked(true);
        status_options.include_ignored(false);

        let statuses = git_repo
            .statuses(Some(&mut status_options))
            .context("Failed to get git status")?;
        let dirty = !statuses.is_empty();

        let ahead = Self::ahead_of_upstream(&git_repo)?;

        Ok(RepoFacts {
            dirty,
            has_upstream: ahead.is_some(),
            ahead: ahead.unwrap_or(0),
        })
    }
}

impl Default for Git2StatusAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_git_repo(path: &Path) -> Result<GitRepository> {
        fs::create_dir_all(path)?;
        let git_repo = GitRepository::init(path)?;
        let signature = git2::Signature::now("Test User", "test@example.com")?;
        let tree_id = git_repo.index()?.write_tree()?;
        {
            let tree = git_repo.find_tree(tree_id)?;
            git_repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])?;
        }
        Ok(git_repo)
    }

    #[test]
    fn test_clean_repo_without_upstream() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_git_repo(temp_dir.path())?;

        let facts = Git2StatusAdapter::new().facts(&RepoPath::new(temp_dir.path(), Path::new("/")))?;
        assert_eq!(
            facts,
            RepoFacts {
                dirty: false,
                has_upstream: false,
                ahead: 0
            }
        );
        Ok(())
    }

    #[test]
    fn test_untracked_file_is_dirty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_git_repo(temp_dir.path())?;
        fs::write(temp_dir.path().join("new.txt"), "untracked")?;

        let facts = Git2StatusAdapter::new().facts(&RepoPath::new(temp_dir.path(), Path::new("/")))?;
        assert!(facts.dirty);
        Ok(())
    }

    #[test]
    fn test_not_a_repository() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let result = Git2StatusAdapter::new().facts(&RepoPath::new(temp_dir.path(), Path::new("/")));
        assert!(result.is_err());
        Ok(())
    }
}
