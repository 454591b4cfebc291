//! Configuration file support for syscfg.
//!
//! syscfg supports two configuration file locations:
//! - Global: `~/.syscfg/config.toml` - User-wide defaults
//! - Project: `.syscfg/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// syscfg configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Installation settings
    pub install: InstallConfig,

    /// Build directory settings
    pub build: BuildConfig,
}

/// Installation-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstallConfig {
    /// Host tool executable used for escalated installs
    pub host: Option<PathBuf>,

    /// Write the registry directly when running a provider (default: true).
    /// When false, installs run through a child `syscfg configure`.
    pub direct_registration: Option<bool>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default build directory, relative to the working directory
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.install.host.is_some() {
            self.install.host = other.install.host;
        }
        if other.install.direct_registration.is_some() {
            self.install.direct_registration = other.install.direct_registration;
        }
        if other.build.dir.is_some() {
            self.build.dir = other.build.dir;
        }
    }

    /// Whether script-mode installs may write the registry directly.
    pub fn direct_registration(&self) -> bool {
        self.install.direct_registration.unwrap_or(true)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.syscfg/config.toml)
/// 2. Global config (~/.syscfg/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// The syscfg directory below a home directory (`<home>/.syscfg`).
pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".syscfg")
}

/// Get the global config path (`<home>/.syscfg/config.toml`).
pub fn global_config_path(home: &Path) -> PathBuf {
    config_dir(home).join("config.toml")
}

/// Get the project config path (`.syscfg/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".syscfg").join("config.toml")
}
