use anyhow::{Context, Result};
use reposync_core::domain::RepoPath;
use reposync_core::error::CoreError;
use reposync_core::ports::{DiscoverReq, DiscoveryPort};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Worktree and submodule checkouts carry a `.git` file starting with this
const GITDIR_PREFIX: &[u8] = b"gitdir:";

/// File system discovery adapter that implements DiscoveryPort
pub struct FsDiscoveryAdapter;

impl FsDiscoveryAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Find the working copies at `root` and its immediate children.
    ///
    /// A leading `~/` is expanded to the home directory. The root is listed
    /// first when it is a repository itself, since it sorts before its children.
    pub fn discover(&self, root: impl AsRef<Path>) -> Result<Vec<RepoPath>> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(CoreError::invalid_argument("root directory must not be empty").into());
        }

        let expanded = expand_tilde(root)?;
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let root = RepoPath::new(&expanded, &cwd);

        let meta = match fs::metadata(root.as_path()) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::not_found(root.to_string()).into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to stat {}", root)));
            }
        };
        if !meta.is_dir() {
            return Err(CoreError::invalid_argument(format!("{} is not a directory", root)).into());
        }

        let mut repositories = Vec::new();
        if has_git_metadata(root.as_path()) {
            repositories.push(root.clone());
        }

        for entry in WalkDir::new(root.as_path()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;

            // Symlinked directories count as children too
            if !entry.path().is_dir() {
                continue;
            }

            if has_git_metadata(entry.path()) {
                repositories.push(RepoPath::new(entry.path(), &cwd));
            }
        }

        repositories.sort_by(|a, b| a.as_path().as_os_str().cmp(b.as_path().as_os_str()));
        debug!("Discovered {} repositories under {}", repositories.len(), root);

        Ok(repositories)
    }
}

impl DiscoveryPort for FsDiscoveryAdapter {
    fn scan(&self, req: DiscoverReq) -> Result<Vec<RepoPath>> {
        self.discover(&req.base)
    }
}

impl Default for FsDiscoveryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace a leading `~/` with the home directory. `~` alone and `~user/`
/// are returned unchanged.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    // "~" and "~/" share their components; only the second one expands
    let rest = match path.strip_prefix("~") {
        Ok(rest) if path.as_os_str().len() > 1 => rest,
        _ => return Ok(path.to_path_buf()),
    };
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(rest))
}

/// True when `dir/.git` is a directory, or a file pointing elsewhere with `gitdir:`.
pub fn has_git_metadata(dir: &Path) -> bool {
    let dot_git = dir.join(".git");
    let meta = match fs::metadata(&dot_git) {
        Ok(meta) => meta,
        Err(_) => return false,
    };

    if meta.is_dir() {
        return true;
    }
    if !meta.is_file() {
        return false;
    }

    let mut prefix = [0u8; GITDIR_PREFIX.len()];
    match fs::File::open(&dot_git).and_then(|mut f| f.read_exact(&mut prefix)) {
        Ok(()) => prefix == GITDIR_PREFIX,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_git_repo(path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        fs::create_dir(path.join(".git"))?;
        Ok(())
    }

    #[test]
    fn test_has_git_metadata() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path();

        let plain = base.join("plain");
        fs::create_dir(&plain)?;
        assert!(!has_git_metadata(&plain));

        let repo = base.join("repo");
        create_test_git_repo(&repo)?;
        assert!(has_git_metadata(&repo));

        let worktree = base.join("worktree");
        fs::create_dir(&worktree)?;
        fs::write(worktree.join(".git"), "gitdir: /elsewhere/.git/worktrees/wt\n")?;
        assert!(has_git_metadata(&worktree));

        let bogus = base.join("bogus");
        fs::create_dir(&bogus)?;
        fs::write(bogus.join(".git"), "not a pointer")?;
        assert!(!has_git_metadata(&bogus));

        let short = base.join("short");
        fs::create_dir(&short)?;
        fs::write(short.join(".git"), "git")?;
        assert!(!has_git_metadata(&short));

        Ok(())
    }

    #[test]
    fn test_find_repos_empty_directory() -> Result<()> {
        let adapter = FsDiscoveryAdapter::new();
        let temp_dir = TempDir::new()?;
        let repos = adapter.discover(temp_dir.path())?;
        assert!(repos.is_empty());
        Ok(())
    }

    #[test]
    fn test_does_not_descend_into_grandchildren() -> Result<()> {
        let adapter = FsDiscoveryAdapter::new();
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path();

        create_test_git_repo(&base_path.join("top"))?;
        create_test_git_repo(&base_path.join("work/nested"))?;

        let repos = adapter.scan(DiscoverReq {
            base: base_path.to_path_buf(),
        })?;
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name(), "top");

        Ok(())
    }

    #[test]
    fn test_ignores_files() -> Result<()> {
        let adapter = FsDiscoveryAdapter::new();
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("notes.txt"), "hello")?;

        let repos = adapter.discover(temp_dir.path())?;
        assert!(repos.is_empty());
        Ok(())
    }

    #[test]
    fn test_errors() -> Result<()> {
        let adapter = FsDiscoveryAdapter::new();

        let err = adapter.discover("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidArgument { .. })
        ));

        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("missing");
        let err = adapter.discover(&missing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound { .. })
        ));

        let file = temp_dir.path().join("file");
        fs::write(&file, "x")?;
        let err = adapter.discover(&file).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidArgument { .. })
        ));

        Ok(())
    }

    #[test]
    fn test_expand_tilde_only_handles_home_prefix() -> Result<()> {
        assert_eq!(expand_tilde(Path::new("~"))?, PathBuf::from("~"));
        assert_eq!(expand_tilde(Path::new("~bob/src"))?, PathBuf::from("~bob/src"));
        assert_eq!(expand_tilde(Path::new("/abs/~/x"))?, PathBuf::from("/abs/~/x"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/src"))?, home.join("src"));
            assert_eq!(expand_tilde(Path::new("~/"))?, home);
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_discovers_under_non_utf8_root() -> Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join(OsStr::from_bytes(b"src-\xff"));
        create_test_git_repo(&root.join("repo"))?;
        create_test_git_repo(&root.join(OsStr::from_bytes(b"lib-\xfe")))?;

        let repos = FsDiscoveryAdapter::new().scan(DiscoverReq { base: root.clone() })?;

        assert_eq!(repos.len(), 2);
        assert!(repos.iter().all(|repo| repo.as_path().starts_with(&root)));
        assert!(repos
            .iter()
            .any(|repo| repo.as_path().file_name() == Some(OsStr::from_bytes(b"lib-\xfe"))));
        Ok(())
    }
}
