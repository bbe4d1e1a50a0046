use anyhow::Result;
use reposync_core::domain::UpdateOptions;
use reposync_core::ports::{AppConfig, ConfigStore};

use crate::cli::{CliArgs, UpdateArgs};

/// Load the stored configuration and apply command-line overrides
pub fn from_cli_and_store(cli_args: &CliArgs, store: &dyn ConfigStore) -> Result<AppConfig> {
    let mut config = store.load()?;

    // CLI args override config file
    if let Some(base_dir) = &cli_args.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(jobs) = cli_args.jobs {
        config.jobs = jobs;
    }

    Ok(config)
}

/// Update options for one run: configured defaults, then flags
pub fn update_options(config: &AppConfig, args: &UpdateArgs) -> UpdateOptions {
    let mut opts = config.update_options(args.dry_run);
    if args.no_prune {
        opts.prune = false;
    }
    if args.autostash {
        opts.autostash = true;
    }
    if args.submodules {
        opts.submodule_update = true;
    }
    opts
}
