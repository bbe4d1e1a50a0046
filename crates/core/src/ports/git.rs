use async_trait::async_trait;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// One git invocation: `git -C <repo> <args...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    pub repo: PathBuf,
    pub args: Vec<String>,
}

impl GitCommand {
    pub fn new<I, S>(repo: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repo: repo.to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments joined by spaces, without the `git -C <repo>` prefix
    pub fn subcommand(&self) -> String {
        self.args.join(" ")
    }
}

impl std::fmt::Display for GitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "git -C {} {}", self.repo.display(), self.subcommand())
    }
}

/// Captured result of a finished git process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Trimmed stdout
    pub fn text(&self) -> &str {
        self.stdout.trim()
    }

    /// stdout and stderr together, trimmed, as shown in failure messages
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        combined.push_str(self.stdout.trim());
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(stderr);
        }
        combined
    }
}

/// Port for running the git executable.
///
/// A non-zero exit is reported through `GitOutput::success`, not as `Err`;
/// `Err` means git could not be run at all.
#[async_trait]
pub trait GitPort: Send + Sync {
    async fn run(&self, cmd: &GitCommand) -> Result<GitOutput>;
}
