//! Sessions and the protocol guard.
//!
//! A [`Session`] is one execution context: either a provider declaring its
//! System, or a consumer reading from it. Consumers may read or write, never
//! both; providers may do either in any order because they are the source
//! being read while it is written.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::{Result, SysCfgError};
use crate::core::host::Host;
use crate::core::identifier::{SystemName, VariableKey};
use crate::core::provider::ProviderFile;
use crate::core::store::{DeclareOutcome, VariableStore};

/// Who is driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// A provider file being evaluated; the guard is bypassed.
    Provider,
    /// An ordinary consuming context; reads and writes are exclusive.
    Consumer,
}

/// Kind of variable access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Get,
    Set,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Get => f.write_str("read"),
            Access::Set => f.write_str("set"),
        }
    }
}

/// Logical state of the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Fresh,
    Reading,
    Writing,
}

/// Tracks whether a context has read or written variables.
#[derive(Debug, Clone)]
pub struct ProtocolGuard {
    mode: ExecutionMode,
    has_called_get: bool,
    has_called_set: bool,
}

impl ProtocolGuard {
    pub fn new(mode: ExecutionMode) -> Self {
        ProtocolGuard {
            mode,
            has_called_get: false,
            has_called_set: false,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn state(&self) -> GuardState {
        match (self.has_called_get, self.has_called_set) {
            (false, false) => GuardState::Fresh,
            (true, false) => GuardState::Reading,
            (false, true) => GuardState::Writing,
            // Only reachable in provider mode.
            (true, true) => GuardState::Writing,
        }
    }

    /// Admit `access`, or fail if the opposite access already happened.
    pub fn check(&mut self, system: &SystemName, access: Access) -> Result<()> {
        if self.mode == ExecutionMode::Consumer {
            let previous = match access {
                Access::Get if self.has_called_set => Some(Access::Set),
                Access::Set if self.has_called_get => Some(Access::Get),
                _ => None,
            };
            if let Some(previous) = previous {
                return Err(SysCfgError::ModeViolation {
                    system: system.to_string(),
                    attempted: access,
                    previous,
                });
            }
        }

        match access {
            Access::Get => self.has_called_get = true,
            Access::Set => self.has_called_set = true,
        }
        Ok(())
    }
}

/// Local variable bindings of the calling context.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One execution context over a shared variable store.
pub struct Session<'a> {
    host: &'a Host,
    store: &'a mut VariableStore,
    guard: ProtocolGuard,
    system: Option<SystemName>,
    scope: Scope,
    origin: Option<PathBuf>,
    install_requested: bool,
    install_completed: bool,
    /// Systems whose providers are being loaded further up the chain.
    loading: BTreeSet<SystemName>,
}

impl<'a> Session<'a> {
    pub fn new(host: &'a Host, store: &'a mut VariableStore, mode: ExecutionMode) -> Self {
        Session {
            host,
            store,
            guard: ProtocolGuard::new(mode),
            system: None,
            scope: Scope::new(),
            origin: None,
            install_requested: false,
            install_completed: false,
            loading: BTreeSet::new(),
        }
    }

    pub fn host(&self) -> &'a Host {
        self.host
    }

    pub fn mode(&self) -> ExecutionMode {
        self.guard.mode()
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn system(&self) -> Option<&SystemName> {
        self.system.as_ref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Mutable access to the calling context's bindings.
    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn store(&self) -> &VariableStore {
        &*self.store
    }

    /// Provider file this session evaluates, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn set_origin(&mut self, path: impl Into<PathBuf>) {
        self.origin = Some(path.into());
    }

    /// Declare the System this session works on.
    ///
    /// Declaring again is allowed only with the same (normalized) name.
    pub fn declare_system(&mut self, raw: &str) -> Result<&SystemName> {
        let name = SystemName::parse(raw)?;
        if let Some(current) = &self.system {
            if *current != name {
                return Err(SysCfgError::SystemNameConflict {
                    system: current.to_string(),
                    requested: name.to_string(),
                });
            }
        } else {
            debug!("declared system {}", name);
        }
        Ok(self.system.get_or_insert(name))
    }

    fn declared_system(&self) -> Result<&SystemName> {
        self.system.as_ref().ok_or(SysCfgError::SystemNotDeclared)
    }

    /// Declare `key = value` for the current System.
    ///
    /// `key` is also the name the value would be bound to in the calling
    /// scope, so it must not already be bound there.
    pub fn set(&mut self, key: &str, value: &str) -> Result<DeclareOutcome> {
        let system = self.declared_system()?.clone();
        let normalized = VariableKey::parse(key)?;
        if self.scope.is_defined(key) {
            return Err(SysCfgError::AlreadyDefined {
                system: system.to_string(),
                name: key.to_string(),
            });
        }
        self.guard.check(&system, Access::Set)?;

        self.store.declare(system.identity(&normalized), value)
    }

    /// Look up `key` for the current System and bind it in the calling scope.
    ///
    /// Missing entries are loaded from the System's registered provider. An
    /// environment variable named like the identity takes precedence over the
    /// stored value without changing it.
    pub fn get(&mut self, key: &str) -> Result<String> {
        let system = self.declared_system()?.clone();
        let normalized = VariableKey::parse(key)?;
        self.guard.check(&system, Access::Get)?;

        let identity = system.identity(&normalized);
        if !self.store.contains(&identity) {
            self.load_provider(&system)?;
        }

        let stored = self
            .store
            .get(&identity)
            .ok_or_else(|| SysCfgError::NotFound {
                system: system.to_string(),
                key: normalized.to_string(),
            })?
            .to_string();

        let value = match self.host.env().var(identity.as_str()) {
            Some(overridden) => {
                debug!("{} overridden from the environment", identity);
                overridden
            }
            None => stored,
        };

        self.scope.define(key, value.clone());
        Ok(value)
    }

    /// Find the System's provider through the registry and evaluate it into
    /// the shared store.
    fn load_provider(&mut self, system: &SystemName) -> Result<()> {
        if self.loading.contains(system) {
            debug!("provider for {} is already being loaded", system);
            return Ok(());
        }

        let identity = system.package_identity();
        let Some(location) = self.host.registry().resolve(&identity)? else {
            debug!("{} is not registered", identity);
            return Ok(());
        };

        let provider_path = location.join(system.provider_file_name());
        if !provider_path.is_file() {
            warn!(
                "{} is registered at {} but {} is missing",
                identity,
                location.display(),
                system.provider_file_name()
            );
            return Ok(());
        }

        info!("loading {} from {}", identity, provider_path.display());
        let provider = ProviderFile::load(&provider_path)?;

        let mut loading = self.loading.clone();
        loading.insert(system.clone());

        let mut nested = Session::new(self.host, &mut *self.store, ExecutionMode::Provider);
        nested.loading = loading;
        provider.evaluate(&mut nested)
    }

    /// Ask for installation once the provider has been evaluated.
    pub fn request_install(&mut self) {
        self.install_requested = true;
    }

    pub fn install_requested(&self) -> bool {
        self.install_requested
    }

    pub fn install_completed(&self) -> bool {
        self.install_completed
    }

    pub(crate) fn mark_install_completed(&mut self) {
        self.install_completed = true;
    }
}
