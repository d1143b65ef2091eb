use super::{Config, ConfigFile};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the per-repository config file
pub const PROJECT_CONFIG_FILE: &str = ".graphlog.toml";

/// Builds a [`Config`] from the global file, the repository file and the
/// environment, later sources overriding earlier ones.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: Config,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$GRAPHLOG_CONFIG_DIR/config.toml`, or `config.toml` in the platform
    /// config directory
    pub fn global_config_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("GRAPHLOG_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.toml"));
        }
        ProjectDirs::from("", "", "graphlog").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub async fn load_global(&mut self) -> Result<()> {
        match Self::global_config_path() {
            Some(path) => {
                self.load_file(&path).await?;
            }
            None => tracing::debug!("No home directory; skipping global config"),
        }
        Ok(())
    }

    pub async fn load_project(&mut self, repository: &Path) -> Result<()> {
        self.load_file(&repository.join(PROJECT_CONFIG_FILE)).await?;
        Ok(())
    }

    /// Apply one config file if it exists. Returns whether it was found.
    pub async fn load_file(&mut self, path: &Path) -> Result<bool> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            tracing::trace!("Config file {:?} not present", path);
            return Ok(false);
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::debug!("Loaded config from {:?}", path);
        self.config.apply(file);
        Ok(true)
    }

    pub fn merge_env_vars(&mut self) {
        self.config.merge_env_vars();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Load the effective configuration for `repository` (or the current
/// directory when `None`)
pub async fn load(repository: Option<&Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    loader.load_global().await?;

    let project_dir = match repository {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    loader.load_project(&project_dir).await?;
    loader.merge_env_vars();

    Ok(loader.into_config())
}
