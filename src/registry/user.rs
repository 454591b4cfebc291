//! File-based package registry in the user's home directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{Result, SysCfgError};
use crate::registry::{location_hash, same_location, PackageRegistry, RegisterOutcome};

/// Registry rooted at `<home>/.syscfg/packages`.
///
/// Each identity owns a directory; each file inside it holds one absolute
/// provider location. Files pointing at locations that no longer exist are
/// ignored on lookup.
#[derive(Debug, Clone)]
pub struct UserRegistry {
    root: PathBuf,
}

impl UserRegistry {
    /// Registry rooted directly at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        UserRegistry { root: root.into() }
    }

    /// Registry in the conventional place below a home directory.
    pub fn for_home(home: impl AsRef<Path>) -> Self {
        Self::new(Self::root_for_home(home.as_ref()))
    }

    /// `<home>/.syscfg/packages`
    pub fn root_for_home(home: &Path) -> PathBuf {
        home.join(".syscfg").join("packages")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every record for `identity`.
    pub fn package_dir(&self, identity: &str) -> PathBuf {
        self.root.join(identity)
    }

    fn records(&self, identity: &str) -> Result<Vec<PathBuf>> {
        let dir = self.package_dir(identity);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|e| SysCfgError::io(format!("failed to read {}", dir.display()), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let mut locations = Vec::new();
        for entry in entries {
            let contents = fs::read_to_string(&entry)
                .map_err(|e| SysCfgError::io(format!("failed to read {}", entry.display()), e))?;
            let location = contents.trim();
            if location.is_empty() {
                continue;
            }
            locations.push(PathBuf::from(location));
        }
        Ok(locations)
    }
}

impl PackageRegistry for UserRegistry {
    fn register(&self, identity: &str, location: &Path) -> Result<RegisterOutcome> {
        if let Some(existing) = self.resolve(identity)? {
            if same_location(&existing, location) {
                return Ok(RegisterOutcome::AlreadyRegistered);
            }
            return Ok(RegisterOutcome::Conflict(existing));
        }

        let dir = self.package_dir(identity);
        fs::create_dir_all(&dir)
            .map_err(|e| SysCfgError::io(format!("failed to create {}", dir.display()), e))?;

        let record = dir.join(location_hash(location));
        fs::write(&record, format!("{}\n", location.display()))
            .map_err(|e| SysCfgError::io(format!("failed to write {}", record.display()), e))?;

        debug!("registered {} -> {}", identity, location.display());
        Ok(RegisterOutcome::Registered)
    }

    fn resolve(&self, identity: &str) -> Result<Option<PathBuf>> {
        for location in self.records(identity)? {
            if location.is_dir() {
                return Ok(Some(location));
            }
            debug!(
                "ignoring stale registry record for {}: {}",
                identity,
                location.display()
            );
        }
        Ok(None)
    }

    fn unregister(&self, identity: &str) -> Result<bool> {
        let dir = self.package_dir(identity);
        if !dir.exists() {
            return Ok(false);
        }
        crate::util::fs::remove_dir_all_if_exists(&dir)?;
        debug!("unregistered {}", identity);
        Ok(true)
    }

    fn record_location(&self, identity: &str) -> String {
        self.package_dir(identity).display().to_string()
    }
}
