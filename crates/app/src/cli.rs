use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "reposync")]
#[command(about = "Find Git working copies and bring them up to date without losing local work")]
pub struct CliArgs {
    /// Directory whose repositories are managed (overrides config)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repositories processed at the same time (overrides config)
    #[arg(long, short = 'j', global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum CliCommand {
    /// List the repositories that would be managed
    Scan,
    /// Show the sync status of every repository
    Status,
    /// Fetch, then rebase each safe repository onto its upstream
    Update(UpdateArgs),
}

#[derive(Args, Debug, PartialEq, Default)]
pub struct UpdateArgs {
    /// Show what would run without changing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Do not pass --prune to fetch
    #[arg(long)]
    pub no_prune: bool,

    /// Pass --autostash to pull
    #[arg(long)]
    pub autostash: bool,

    /// Update submodules after pulling
    #[arg(long)]
    pub submodules: bool,
}

impl CliArgs {
    pub fn command(&self) -> &CliCommand {
        self.command.as_ref().unwrap_or(&CliCommand::Status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_defaults_to_status() {
        let args = CliArgs::parse_from(["reposync"]);
        assert_eq!(args.base_dir, None);
        assert_eq!(args.config, None);
        assert_eq!(args.command(), &CliCommand::Status);
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "reposync",
            "scan",
            "--base-dir",
            "/test/path",
            "--config",
            "/custom/config.toml",
            "-j",
            "4",
        ]);
        assert_eq!(args.base_dir, Some(PathBuf::from("/test/path")));
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.command(), &CliCommand::Scan);
    }

    #[test]
    fn test_cli_parse_update_flags() {
        let args = CliArgs::parse_from(["reposync", "update", "--dry-run", "--no-prune", "--submodules"]);
        assert_eq!(
            args.command(),
            &CliCommand::Update(UpdateArgs {
                dry_run: true,
                no_prune: true,
                autostash: false,
                submodules: true,
            })
        );
    }
}
