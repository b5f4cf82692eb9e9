use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "BIOTOOLS_CURATOR_CONFIG";

impl Config {
    /// Resolve the configuration file, apply environment overrides and
    /// validate.
    ///
    /// An explicit path must exist. Without one, `$BIOTOOLS_CURATOR_CONFIG`
    /// is tried, then `~/.biotools-curator/config.toml`; a missing default
    /// file yields built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(path) if !path.trim().is_empty() => {
                    Self::load_from_path(&expand_path(&path))?
                }
                _ => match default_config_path() {
                    Some(path) if path.exists() => Self::load_from_path(&path)?,
                    _ => {
                        tracing::debug!("No config file found, using defaults");
                        Self::default()
                    }
                },
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Output directory with `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        expand_path(&self.pipeline.output_dir)
    }
}

fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".biotools-curator").join("config.toml"))
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
