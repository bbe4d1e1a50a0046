use anyhow::Result;
use reposync::adapters::status::Git2StatusAdapter;
use reposync::context::SyncContext;
use reposync::services::status_service::StatusService;
use reposync_core::domain::{classify, RepoPath, Status};
use reposync_core::ports::StatusPort;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn commit(git_repo: &git2::Repository, message: &str) -> Result<git2::Oid> {
    let signature = git2::Signature::now("Test User", "test@example.com")?;
    let tree_id = git_repo.index()?.write_tree()?;
    let tree = git_repo.find_tree(tree_id)?;
    let parents = match git_repo.head() {
        Ok(head) => vec![head.peel_to_commit()?],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    Ok(git_repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)?)
}

fn create_test_git_repo(path: &Path) -> Result<git2::Repository> {
    fs::create_dir_all(path)?;
    let git_repo = git2::Repository::init(path)?;
    commit(&git_repo, "Initial commit")?;
    Ok(git_repo)
}

/// Point `origin/<branch>` at HEAD and make it the current branch's upstream
fn track_origin(git_repo: &git2::Repository) -> Result<()> {
    let head = git_repo.head()?;
    let branch_name = head.shorthand().unwrap_or("main").to_string();
    let oid = head.target().expect("HEAD has a target");

    git_repo.remote("origin", "https://example.invalid/repo.git")?;
    git_repo.reference(
        &format!("refs/remotes/origin/{branch_name}"),
        oid,
        true,
        "test upstream",
    )?;
    let mut branch = git_repo.find_branch(&branch_name, git2::BranchType::Local)?;
    branch.set_upstream(Some(&format!("origin/{branch_name}")))?;
    Ok(())
}

fn facts_status(path: &Path) -> Result<Status> {
    let facts = Git2StatusAdapter::new().facts(&RepoPath::new(path, Path::new("/")))?;
    Ok(classify(facts.dirty, facts.has_upstream, facts.ahead))
}

#[test]
fn test_status_of_each_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path();

    let no_upstream = base.join("no-upstream");
    create_test_git_repo(&no_upstream)?;
    assert_eq!(facts_status(&no_upstream)?, Status::NoUpstream);

    let clean = base.join("clean");
    let clean_repo = create_test_git_repo(&clean)?;
    track_origin(&clean_repo)?;
    assert_eq!(facts_status(&clean)?, Status::Clean);

    let unpushed = base.join("unpushed");
    let unpushed_repo = create_test_git_repo(&unpushed)?;
    track_origin(&unpushed_repo)?;
    commit(&unpushed_repo, "Local work")?;
    commit(&unpushed_repo, "More local work")?;
    let facts = Git2StatusAdapter::new().facts(&RepoPath::new(&unpushed, Path::new("/")))?;
    assert_eq!(facts.ahead, 2);
    assert_eq!(facts_status(&unpushed)?, Status::Unpushed);

    // Dirty wins over everything else
    let dirty = base.join("dirty");
    let dirty_repo = create_test_git_repo(&dirty)?;
    track_origin(&dirty_repo)?;
    commit(&dirty_repo, "Local work")?;
    fs::write(dirty.join("scratch.txt"), "uncommitted")?;
    assert_eq!(facts_status(&dirty)?, Status::Dirty);

    let detached = base.join("detached");
    let detached_repo = create_test_git_repo(&detached)?;
    track_origin(&detached_repo)?;
    let head_commit = detached_repo.head()?.peel_to_commit()?.id();
    detached_repo.set_head_detached(head_commit)?;
    assert_eq!(facts_status(&detached)?, Status::NoUpstream);

    Ok(())
}

#[tokio::test]
async fn test_status_service_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path();
    create_test_git_repo(&base.join("one"))?;
    fs::create_dir_all(base.join("two"))?;

    let repos = vec![
        RepoPath::new(base.join("one"), Path::new("/")),
        RepoPath::new(base.join("two"), Path::new("/")),
    ];
    let service = Arc::new(StatusService::new(Arc::new(Git2StatusAdapter::new())));
    let report = service.report(&SyncContext::background(), &repos, 4).await;

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].1.as_ref().ok(), Some(&Status::NoUpstream));
    assert!(report[1].1.is_err(), "plain directory is not a repository");
    Ok(())
}
