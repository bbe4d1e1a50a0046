//! Scripted GitPort for service tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reposync_core::ports::{GitCommand, GitOutput, GitPort};
use std::collections::HashMap;
use std::sync::Mutex;

enum Reply {
    Output(GitOutput),
    Error(String),
    Hang,
}

/// Answers git invocations by subcommand text and records every call
#[derive(Default)]
pub struct FakeGit {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clean checkout of `main` tracking `origin/main`, which is also the
    /// remote's default branch. Mutating commands succeed.
    pub fn safe_repo() -> Self {
        Self::new()
            .respond("fetch --all", GitOutput::ok(""))
            .respond("fetch --all --prune", GitOutput::ok(""))
            .respond("status --porcelain", GitOutput::ok(""))
            .respond("stash list", GitOutput::ok(""))
            .respond("rev-parse --abbrev-ref HEAD", GitOutput::ok("main\n"))
            .respond(
                "rev-parse --abbrev-ref --symbolic-full-name @{u}",
                GitOutput::ok("origin/main\n"),
            )
            .respond("rev-list --count @{u}..HEAD", GitOutput::ok("0\n"))
            .respond(
                "symbolic-ref --quiet refs/remotes/origin/HEAD",
                GitOutput::ok("refs/remotes/origin/main\n"),
            )
            .respond("pull --rebase", GitOutput::ok("Already up to date.\n"))
            .respond("pull --rebase --autostash", GitOutput::ok("Already up to date.\n"))
            .respond("submodule update --init --recursive --remote", GitOutput::ok(""))
    }

    pub fn respond(mut self, subcommand: &str, output: GitOutput) -> Self {
        self.replies.insert(subcommand.to_string(), Reply::Output(output));
        self
    }

    /// git cannot be run at all for this subcommand
    pub fn error(mut self, subcommand: &str, msg: &str) -> Self {
        self.replies.insert(subcommand.to_string(), Reply::Error(msg.to_string()));
        self
    }

    /// Never finishes
    pub fn hang(mut self, subcommand: &str) -> Self {
        self.replies.insert(subcommand.to_string(), Reply::Hang);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl GitPort for FakeGit {
    async fn run(&self, cmd: &GitCommand) -> Result<GitOutput> {
        let subcommand = cmd.subcommand();
        self.calls.lock().unwrap().push(subcommand.clone());

        match self.replies.get(&subcommand) {
            Some(Reply::Output(out)) => Ok(out.clone()),
            Some(Reply::Error(msg)) => Err(anyhow!("{}", msg)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(anyhow!("unscripted git command: {}", subcommand)),
        }
    }
}
