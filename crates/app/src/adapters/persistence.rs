use anyhow::{Context, Result};
use directories::ProjectDirs;
use reposync_core::ports::{AppConfig, ConfigStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File-based configuration store that implements ConfigStore
pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_default_config_path()?;
        Ok(Self { config_path })
    }

    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "reposync")
            .context("Failed to determine project directories")?;

        let config_dir = proj_dirs.config_dir();
        Ok(config_dir.join("reposync.toml"))
    }

    /// A fresh configuration scans the home directory
    fn default_config() -> AppConfig {
        AppConfig::with_base_dir(dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Create default config if it doesn't exist
    fn ensure_config_exists(&self, default_config: &AppConfig) -> Result<()> {
        if !self.config_path.exists() {
            // Create directory if it doesn't exist
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
            self.save(default_config)?;
            info!("Wrote default configuration to {}", self.config_path.display());
        }
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<AppConfig> {
        self.ensure_config_exists(&Self::default_config())?;

        let contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {}", self.config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.config_path.display()))?;

        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        let contents = toml::to_string_pretty(config)
            .context("Failed to serialize config to TOML")?;

        fs::write(&self.config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", self.config_path.display()))?;

        Ok(())
    }
}
