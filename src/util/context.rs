//! Global context for syscfg operations.
//!
//! Provides centralized access to configuration, paths, and environment. One
//! context is built per invocation and passed explicitly to every command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::host::{Host, HostMode, InstallSettings, ProcessEnv};
use crate::core::store::VariableStore;
use crate::registry::{self, Platform};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::process::{find_executable, Executor, SystemExecutor};

/// Default build directory name, relative to the working directory.
pub const DEFAULT_BUILD_DIR: &str = ".syscfg-build";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// User home directory; the registry and global config live below it
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Merged global and project configuration
    config: Config,

    /// Build directory requested on the command line
    build_dir: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext from the process environment.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = registry::home_dir(&ProcessEnv);
        Ok(Self::with_paths(cwd, home))
    }

    /// Create a GlobalContext for a specific working and home directory.
    pub fn with_paths(cwd: PathBuf, home: PathBuf) -> Self {
        let config = load_config(&global_config_path(&home), &project_config_path(&cwd));
        GlobalContext {
            cwd,
            home,
            verbose: false,
            config,
            build_dir: None,
        }
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Override the build directory.
    pub fn set_build_dir(&mut self, dir: Option<PathBuf>) {
        self.build_dir = dir;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the user's home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build directory holding `SysCfgCache.toml`.
    ///
    /// Command line first, then `[build] dir`, then `.syscfg-build` in the
    /// working directory. Relative paths resolve against the working
    /// directory.
    pub fn build_dir(&self) -> PathBuf {
        let dir = self
            .build_dir
            .clone()
            .or_else(|| self.config.build.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        if dir.is_absolute() {
            dir
        } else {
            self.cwd.join(dir)
        }
    }

    /// Open the variable store of the build directory.
    pub fn open_store(&self) -> crate::core::error::Result<VariableStore> {
        VariableStore::open(&self.build_dir())
    }

    /// Store for a one-off script-mode read.
    ///
    /// Nothing is cached unless a build directory was given on the command
    /// line, so values vanish with their registration.
    pub fn open_script_store(&self) -> crate::core::error::Result<VariableStore> {
        match self.build_dir {
            Some(_) => self.open_store(),
            None => Ok(VariableStore::in_memory()),
        }
    }

    /// Host tool executable used when an install escalates.
    pub fn host_program(&self) -> PathBuf {
        self.config
            .install
            .host
            .clone()
            .or_else(|| std::env::current_exe().ok())
            .or_else(|| find_executable("syscfg"))
            .unwrap_or_else(|| PathBuf::from("syscfg"))
    }

    /// Build the host for one invocation in `mode`.
    pub fn host(&self, mode: HostMode, allow_install: bool) -> Host {
        let platform = Platform::current();
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let registry = registry::for_platform(platform, &ProcessEnv, executor.clone());

        Host::new(mode, registry)
            .with_platform(platform)
            .with_executor(executor)
            .with_install_settings(InstallSettings {
                allow_install,
                direct_registration: self.config.direct_registration(),
                host_program: self.host_program(),
            })
    }
}
