use anyhow::{Context, Result};
use async_trait::async_trait;
use reposync_core::ports::{GitCommand, GitOutput, GitPort};
use std::process::Stdio;
use tokio::process::Command;
use tracing::trace;

/// Git adapter that implements GitPort by running the git executable
pub struct GitCliAdapter {
    binary: String,
}

impl GitCliAdapter {
    pub fn new() -> Self {
        Self::with_binary("git")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl GitPort for GitCliAdapter {
    async fn run(&self, cmd: &GitCommand) -> Result<GitOutput> {
        trace!("Running {}", cmd);

        // Dropping the future (cancellation, deadline) kills the child
        let output = Command::new(&self.binary)
            .arg("-C")
            .arg(&cmd.repo)
            .args(&cmd.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", cmd))?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Default for GitCliAdapter {
    fn default() -> Self {
        Self::new()
    }
}
