use crate::domain::update::UpdateOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration store interface
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage
    fn load(&self) -> Result<AppConfig>;

    /// Save configuration to storage
    fn save(&self, config: &AppConfig) -> Result<()>;
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    pub base_dir: PathBuf,
    /// Repositories processed at the same time
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Per-repository deadline in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Update behaviour configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub prune: bool,
    pub autostash: bool,
    pub submodule_update: bool,
}

fn default_jobs() -> usize {
    8
}

fn default_git_binary() -> String {
    "git".to_string()
}

impl AppConfig {
    /// Configuration with every default except the directory to scan.
    /// Picking that directory is left to the store.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: 1,
            base_dir: base_dir.into(),
            jobs: default_jobs(),
            timeout_secs: None,
            git_binary: default_git_binary(),
            update: UpdateConfig::default(),
        }
    }

    /// Update options for one run; dry-run is never persisted
    pub fn update_options(&self, dry_run: bool) -> UpdateOptions {
        UpdateOptions {
            prune: self.update.prune,
            autostash: self.update.autostash,
            submodule_update: self.update.submodule_update,
            dry_run,
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            prune: true,
            autostash: false,
            submodule_update: false,
        }
    }
}
