//! SysCfgProject.toml parsing.
//!
//! A project manifest drives `syscfg configure`. It may evaluate providers in
//! place (optionally installing them) and may act as a consumer of one System,
//! either reading or writing its variables:
//!
//! ```toml
//! [project]
//! name = "consumer"
//! system = "example"
//! get = ["variable_a"]
//!
//! [[provider]]
//! path = "SysCfgEXAMPLEConfig.toml"
//! install = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{Result, SysCfgError};
use crate::util::fs::read_to_string;

/// File name of a project manifest.
pub const MANIFEST_FILE_NAME: &str = "SysCfgProject.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    project: ProjectSection,
    #[serde(default, rename = "provider")]
    providers: Vec<ProviderEntry>,
}

/// The `[project]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project name, used in log output only.
    pub name: String,

    /// System consumed by this project.
    #[serde(default)]
    pub system: Option<String>,

    /// Keys to read from `system`.
    #[serde(default)]
    pub get: Vec<String>,

    /// Values to declare for `system`.
    #[serde(default)]
    pub set: BTreeMap<String, String>,
}

impl ProjectSection {
    /// Whether the project touches any System variables as a consumer.
    pub fn consumes(&self) -> bool {
        !self.get.is_empty() || !self.set.is_empty()
    }
}

/// One `[[provider]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderEntry {
    /// Provider file, relative to the manifest directory.
    pub path: PathBuf,

    /// Request installation once the provider is evaluated.
    #[serde(default)]
    pub install: bool,
}

/// A parsed project manifest.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub project: ProjectSection,
    pub providers: Vec<ProviderEntry>,
    /// The directory containing this manifest.
    pub manifest_dir: PathBuf,
}

impl ProjectManifest {
    /// Locate the manifest for `path`: the file itself, or
    /// `SysCfgProject.toml` inside a directory.
    pub fn find(path: &Path) -> PathBuf {
        if path.is_dir() {
            path.join(MANIFEST_FILE_NAME)
        } else {
            path.to_path_buf()
        }
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest =
            toml::from_str(content).map_err(|e| SysCfgError::invalid_file(path, e))?;

        if raw.project.consumes() && raw.project.system.is_none() {
            return Err(SysCfgError::invalid_file(
                path,
                "`get` and `set` require `project.system`",
            ));
        }

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(ProjectManifest {
            project: raw.project,
            providers: raw.providers,
            manifest_dir,
        })
    }

    /// Absolute path of a provider entry.
    pub fn provider_path(&self, entry: &ProviderEntry) -> PathBuf {
        self.manifest_dir.join(&entry.path)
    }
}
