// Composition root: wires adapters into the services and renders results

use anyhow::{bail, Result};
use clap::Parser;
use reposync::adapters::{
    discovery::FsDiscoveryAdapter, git::GitCliAdapter, persistence::FileConfigStore,
    status::Git2StatusAdapter,
};
use reposync::cli::{CliArgs, CliCommand};
use reposync::config;
use reposync::context::SyncContext;
use reposync::services::app_service::AppService;
use reposync_core::domain::UpdateResult;
use reposync_core::ports::{DiscoveryPort, GitPort, StatusPort};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting reposync");

    let cli_args = CliArgs::parse();
    let config_store = match &cli_args.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new()?,
    };
    let config = config::from_cli_and_store(&cli_args, &config_store)?;
    info!(
        "Loaded config from {} with base_dir: {}",
        config_store.path().display(),
        config.base_dir.display()
    );

    // Create adapters (dependency injection)
    let git_port: Arc<dyn GitPort> = Arc::new(GitCliAdapter::with_binary(config.git_binary.clone()));
    let discovery_port: Arc<dyn DiscoveryPort> = Arc::new(FsDiscoveryAdapter::new());
    let status_port: Arc<dyn StatusPort> = Arc::new(Git2StatusAdapter::new());

    let app = AppService::new(git_port, discovery_port, status_port)
        .with_jobs(config.jobs)
        .with_timeout(config.timeout_secs.map(Duration::from_secs));

    let (ctx, cancel) = SyncContext::with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling running git commands");
            cancel.cancel();
        }
    });

    let repos = app.discover(config.base_dir.clone()).await?;

    match cli_args.command() {
        CliCommand::Scan => {
            for repo in &repos {
                println!("{}", repo);
            }
        }
        CliCommand::Status => {
            let mut failed = 0;
            for (repo, status) in app.status_all(&ctx, &repos).await {
                match status {
                    Ok(status) => println!("{:<12} {}", status.label(), repo),
                    Err(e) => {
                        failed += 1;
                        println!("{:<12} {} ({})", "error", repo, e);
                    }
                }
            }
            if failed > 0 {
                bail!("could not read the status of {} of {} repositories", failed, repos.len());
            }
        }
        CliCommand::Update(args) => {
            let opts = config::update_options(&config, args);
            let mut failed = 0;
            for (repo, result) in app.update_all(&ctx, &repos, opts).await {
                match result {
                    Ok(update) => print!("{}", render_update(&update, opts.dry_run)),
                    Err(e) => {
                        failed += 1;
                        println!("{}\n  error: {}", repo, e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} repositories failed to update", failed, repos.len());
            }
        }
    }

    info!("reposync finished");
    Ok(())
}

/// Transcript of one update: the repository, each command, each skip reason
fn render_update(update: &UpdateResult, dry_run: bool) -> String {
    let mut out = format!("{}\n", update.repo);
    let verb = if dry_run { "would run" } else { "ran" };
    for command in &update.commands {
        out.push_str(&format!("  {}: {}\n", verb, command));
    }
    for message in &update.skipped_messages {
        out.push_str(&format!("  skipped: {}\n", message));
    }
    out
}
