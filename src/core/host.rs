//! The host environment a session runs in.
//!
//! A [`Host`] bundles everything that lives outside the registry protocol
//! itself: how the tool was invoked, the package registry, the process
//! environment and the means to run subprocesses. It is built once per
//! invocation and borrowed by every session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::registry::{PackageRegistry, Platform};
use crate::util::process::{Executor, SystemExecutor};

/// How the host tool was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Evaluating a project manifest (`syscfg configure`). Registration is
    /// always available here, behind the `allow-install` capability.
    Project,
    /// Running a provider or a one-off lookup directly (`syscfg run`,
    /// `syscfg get`).
    Script,
}

/// Read access to environment variables.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Installation capabilities of the current invocation.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    /// Granted by the invoking project (`--allow-install`); required for
    /// registration in project mode.
    pub allow_install: bool,
    /// Whether the registry can be written directly in script mode. When
    /// false, script-mode installs escalate to a child project-mode run.
    pub direct_registration: bool,
    /// Host tool executable used for escalation.
    pub host_program: PathBuf,
}

impl Default for InstallSettings {
    fn default() -> Self {
        InstallSettings {
            allow_install: false,
            direct_registration: true,
            host_program: PathBuf::from("syscfg"),
        }
    }
}

/// Everything a session needs from the outside world.
pub struct Host {
    mode: HostMode,
    platform: Platform,
    registry: Box<dyn PackageRegistry>,
    env: Box<dyn Environment>,
    executor: Arc<dyn Executor>,
    install: InstallSettings,
}

impl Host {
    /// Create a host with the real environment and subprocesses.
    pub fn new(mode: HostMode, registry: Box<dyn PackageRegistry>) -> Self {
        Host {
            mode,
            platform: Platform::current(),
            registry,
            env: Box::new(ProcessEnv),
            executor: Arc::new(SystemExecutor),
            install: InstallSettings::default(),
        }
    }

    pub fn with_env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_install_settings(mut self, install: InstallSettings) -> Self {
        self.install = install;
        self
    }

    pub fn mode(&self) -> HostMode {
        self.mode
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn registry(&self) -> &dyn PackageRegistry {
        self.registry.as_ref()
    }

    pub fn env(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    pub fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    pub fn install_settings(&self) -> &InstallSettings {
        &self.install
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("mode", &self.mode)
            .field("platform", &self.platform)
            .field("install", &self.install)
            .finish_non_exhaustive()
    }
}
