use super::repo::RepoPath;
use serde::{Deserialize, Serialize};

/// Options for one update run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Pass `--prune` to fetch
    pub prune: bool,
    /// Pass `--autostash` to pull
    pub autostash: bool,
    /// Touch submodules at all
    pub submodule_update: bool,
    /// Observe and plan, but never run a mutating command
    pub dry_run: bool,
}

/// Outcome of one update run.
///
/// `commands` lists every command that ran or would have run, in order.
/// A repository skipped for an unsafe state or an unobservable state was not
/// touched beyond the fetch.
///
/// A `no upstream configured` skip is weaker: only the pull is left out, and
/// the submodule update still runs when `submodule_update` is set. A
/// non-empty `skipped_messages` therefore does not by itself mean that no
/// mutating command ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub repo: RepoPath,
    pub commands: Vec<String>,
    pub skipped_messages: Vec<String>,
    pub upstream_checked: bool,
    pub has_upstream: bool,
}

impl UpdateResult {
    pub fn new(repo: RepoPath) -> Self {
        Self {
            repo,
            commands: Vec::new(),
            skipped_messages: Vec::new(),
            upstream_checked: false,
            has_upstream: false,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !self.skipped_messages.is_empty()
    }
}
