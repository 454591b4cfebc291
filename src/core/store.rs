//! Durable variable storage.
//!
//! Declared variables live in `SysCfgCache.toml` inside the build directory
//! and survive across invocations that share that directory. A fresh build
//! directory starts with an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{Result, SysCfgError};
use crate::core::identifier::{Identity, SystemName};
use crate::util::fs::{read_to_string, write_atomic};

/// File name of the store inside a build directory.
pub const CACHE_FILE_NAME: &str = "SysCfgCache.toml";

const CACHE_VERSION: u32 = 1;

const CACHE_HEADER: &str = "# Generated by syscfg. Values are first-write-wins; do not edit.\n\n";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<Identity, String>,
}

/// What a declaration did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// A new entry was written.
    Created,
    /// The entry existed with the same value.
    Unchanged,
    /// The entry existed with a different value, which was kept.
    Kept { existing: String },
}

/// The set of persisted `SYSTEM_KEY = value` entries.
#[derive(Debug, Default)]
pub struct VariableStore {
    path: Option<PathBuf>,
    entries: BTreeMap<Identity, String>,
}

impl VariableStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store of `build_dir`, starting empty if it has none yet.
    pub fn open(build_dir: &Path) -> Result<Self> {
        let path = build_dir.join(CACHE_FILE_NAME);
        let entries = if path.is_file() {
            let contents = read_to_string(&path)?;
            let cache: CacheFile =
                toml::from_str(&contents).map_err(|e| SysCfgError::invalid_file(&path, e))?;
            if cache.version != CACHE_VERSION {
                return Err(SysCfgError::invalid_file(
                    &path,
                    format!(
                        "unsupported cache version {} (expected {})",
                        cache.version, CACHE_VERSION
                    ),
                ));
            }
            cache.entries
        } else {
            BTreeMap::new()
        };

        debug!("opened variable store {} ({} entries)", path.display(), entries.len());
        Ok(VariableStore {
            path: Some(path),
            entries,
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, identity: &Identity) -> Option<&str> {
        self.entries.get(identity).map(String::as_str)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries belonging to `system`, in identity order.
    pub fn entries_for<'a>(
        &'a self,
        system: &'a SystemName,
    ) -> impl Iterator<Item = (&'a Identity, &'a str)> + 'a {
        let prefix = format!("{}_", system.as_str());
        self.entries
            .iter()
            .filter(move |(identity, _)| identity.as_str().starts_with(&prefix))
            .map(|(identity, value)| (identity, value.as_str()))
    }

    /// Record `value` under `identity`. The first write wins: an existing
    /// entry is never replaced, a differing value only produces a warning.
    pub fn declare(&mut self, identity: Identity, value: &str) -> Result<DeclareOutcome> {
        if let Some(existing) = self.entries.get(&identity) {
            if existing == value {
                return Ok(DeclareOutcome::Unchanged);
            }
            warn!(
                "{} is already set to {:?}; ignoring new value {:?}",
                identity, existing, value
            );
            return Ok(DeclareOutcome::Kept {
                existing: existing.clone(),
            });
        }

        debug!("declared {} = {:?}", identity, value);
        self.entries.insert(identity, value.to_string());
        self.save()?;
        Ok(DeclareOutcome::Created)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let cache = CacheFile {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        let body = toml::to_string_pretty(&cache)
            .map_err(|e| SysCfgError::invalid_file(path, e))?;
        write_atomic(path, &format!("{CACHE_HEADER}{body}"))
    }
}
