//! Package registry clients.
//!
//! The package registry maps a package identity (`SysCfg<SYSTEM>`) to the
//! directory holding that System's provider file. It is the only state shared
//! between otherwise independent projects:
//!
//! - Unix-like systems keep one directory per identity under
//!   `~/.syscfg/packages/<identity>/`, each file inside naming one location.
//! - Windows keeps one registry key per identity under
//!   `HKCU\Software\Syscfg\Syscfg\Packages\<identity>`.

pub mod user;
pub mod windows;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::core::error::Result;
use crate::core::host::Environment;
use crate::util::process::Executor;

pub use user::UserRegistry;
pub use windows::WindowsRegistry;

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new record was written.
    Registered,
    /// The identity already points at this location.
    AlreadyRegistered,
    /// The identity points at a different location; nothing was written.
    Conflict(PathBuf),
}

/// Client for the package-discovery service.
pub trait PackageRegistry {
    /// Record `location` for `identity`. At most one location per identity.
    fn register(&self, identity: &str, location: &Path) -> Result<RegisterOutcome>;

    /// Look up the location recorded for `identity`.
    fn resolve(&self, identity: &str) -> Result<Option<PathBuf>>;

    /// Drop every record for `identity`, returning whether any existed.
    fn unregister(&self, identity: &str) -> Result<bool>;

    /// Human-readable location of the record for `identity`.
    fn record_location(&self, identity: &str) -> String;
}

/// Operating-system family, which decides the registry backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
    Other(&'static str),
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(unix) {
            Platform::Unix
        } else {
            Platform::Other(std::env::consts::OS)
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Unix => f.write_str("unix"),
            Platform::Other(name) => f.write_str(name),
        }
    }
}

/// Build the registry client native to `platform`.
///
/// Platforms without a native registry fall back to the file-based layout so
/// that lookups keep working; only uninstall refuses them.
pub fn for_platform(
    platform: Platform,
    env: &dyn Environment,
    executor: Arc<dyn Executor>,
) -> Box<dyn PackageRegistry> {
    match platform {
        Platform::Windows => Box::new(WindowsRegistry::new(executor)),
        Platform::Unix | Platform::Other(_) => Box::new(UserRegistry::for_home(home_dir(env))),
    }
}

/// Home directory from `HOME`, falling back to the platform lookup and
/// finally to the working directory.
pub fn home_dir(env: &dyn Environment) -> PathBuf {
    env.var("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Stable record name for a location: the first 32 hex digits of its SHA-256.
pub fn location_hash(location: &Path) -> String {
    let digest = Sha256::digest(location.to_string_lossy().as_bytes());
    hex::encode(&digest[..16])
}

/// Compare two locations after resolving symlinks where possible.
pub fn same_location(a: &Path, b: &Path) -> bool {
    crate::util::fs::normalize_path(a) == crate::util::fs::normalize_path(b)
}
