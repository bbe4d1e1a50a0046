use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// An absolute, lexically cleaned path to a Git working copy.
///
/// The cleaned path is the repository's only identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoPath(PathBuf);

impl RepoPath {
    /// Wrap a path, cleaning it lexically. Relative paths are resolved
    /// against `base`.
    pub fn new(path: impl AsRef<Path>, base: &Path) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };
        Self(clean_path(&absolute))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn name(&self) -> String {
        self.0
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Lexically clean a path: drop `.` segments, fold `..` into its parent and
/// collapse repeated separators. The filesystem is never consulted.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    cleaned.pop();
                    depth -= 1;
                } else if !path.has_root() {
                    cleaned.push("..");
                }
            }
            Component::Normal(part) => {
                cleaned.push(part);
                depth += 1;
            }
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Observed facts about one repository, the input to [`classify`](super::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFacts {
    pub dirty: bool,
    pub has_upstream: bool,
    pub ahead: i64,
}

/// Upstream tracking state of the current branch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpstreamState {
    /// Tracking ref in `remote/branch` form, `None` when no upstream is configured
    pub upstream: Option<String>,
    pub ahead: i64,
}

impl UpstreamState {
    pub fn has_upstream(&self) -> bool {
        self.upstream.is_some()
    }
}
