//! Filesystem utilities.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::core::error::{Result, SysCfgError};

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            SysCfgError::io(format!("failed to remove directory: {}", path.display()), e)
        })?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            SysCfgError::io(format!("failed to create directory: {}", path.display()), e)
        })?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| SysCfgError::io(format!("failed to read file: {}", path.display()), e))
}

/// Replace `path` with `contents` via a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let write_err = |e| SysCfgError::io(format!("failed to write file: {}", path.display()), e);
    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// The set of entries below a directory at one point in time.
#[derive(Debug, Clone)]
pub struct DirSnapshot {
    root: PathBuf,
    entries: BTreeSet<PathBuf>,
}

impl DirSnapshot {
    /// Record every file and directory below `root` (not `root` itself).
    pub fn capture(root: &Path) -> Result<Self> {
        let mut entries = BTreeSet::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.map_err(|e| {
                let message = format!("failed to scan {}", root.display());
                match e.into_io_error() {
                    Some(io) => SysCfgError::io(message, io),
                    None => SysCfgError::invalid_file(root, message),
                }
            })?;
            entries.insert(relative_path(root, entry.path()));
        }
        Ok(DirSnapshot {
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.entries.contains(relative)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete everything present now that was absent from this snapshot.
    ///
    /// Only the topmost new entry of each new subtree is removed, so a new
    /// directory goes away together with its contents. Returns the removed
    /// paths relative to the root.
    pub fn remove_new_entries(&self) -> Result<Vec<PathBuf>> {
        let now = DirSnapshot::capture(&self.root)?;
        let mut removed: Vec<PathBuf> = Vec::new();

        for relative in &now.entries {
            if self.contains(relative) {
                continue;
            }
            if removed.iter().any(|parent| relative.starts_with(parent)) {
                continue;
            }

            let path = self.root.join(relative);
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| {
                SysCfgError::io(format!("failed to remove {}", path.display()), e)
            })?;
            removed.push(relative.clone());
        }

        Ok(removed)
    }
}
