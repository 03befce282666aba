//! CLI configuration
//!
//! Remembers which catalog root was opened last. Loaded from:
//! 1. Default values
//! 2. Config file (~/.config/assetroom/config.toml, `ASSETROOM_CONFIG` or `--config`)
//! 3. Environment variables (ASSETROOM_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "ASSETROOM";

/// Keys accepted by `config set`
pub const KEYS: &[&str] = &["last_root", "log_file"];

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog root used when `--root` is not given
    #[serde(default)]
    pub last_root: Option<PathBuf>,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration, preferring an explicit path over the default
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load_from_path(&Self::config_file_path()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load only what the file at `path` contains, ignoring the environment
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Read the file at `path`, apply `change` and write it back
    ///
    /// Environment overrides are not applied, so they never end up saved.
    pub fn update_file(
        path: &Path,
        change: impl FnOnce(&mut Config) -> Result<()>,
    ) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        change(&mut config)?;
        config.save_to_path(path)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_ROOT", ENV_PREFIX)) {
            self.last_root = non_empty(val);
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = non_empty(val);
        }
    }

    /// Set a value by key, as `config set` does
    ///
    /// An empty value or `none` clears the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = if value == "none" { String::new() } else { value.to_string() };
        match key {
            "last_root" => self.last_root = non_empty(value),
            "log_file" => self.log_file = non_empty(value),
            _ => anyhow::bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ASSETROOM_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("assetroom")
            .join("config.toml")
    }
}

fn non_empty(val: String) -> Option<PathBuf> {
    if val.is_empty() {
        None
    } else {
        Some(PathBuf::from(val))
    }
}
