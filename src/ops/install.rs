//! Installation: making a System's provider discoverable.
//!
//! Installing records the provider's directory in the package registry under
//! `SysCfg<SYSTEM>`. In project mode the registry is written directly, but
//! only when the invoking project grants `allow-install`. In script mode the
//! registry is written directly when the host supports it; otherwise the work
//! is handed to a child project-mode run (see [`crate::ops::escalate`]).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{Result, SysCfgError};
use crate::core::host::{Host, HostMode};
use crate::core::identifier::SystemName;
use crate::core::session::Session;
use crate::ops::escalate;
use crate::registry::{same_location, RegisterOutcome};

/// What an install request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No installation was requested.
    NotRequested,
    /// This session already installed; nothing was repeated.
    AlreadyCompleted,
    /// The registry already pointed at this provider.
    AlreadyInstalled { location: PathBuf },
    /// The registry was written in place.
    Registered { location: PathBuf },
    /// The registry was written by an escalated child run.
    Escalated { location: PathBuf },
}

impl InstallOutcome {
    /// Whether this outcome changed the registry.
    pub fn changed_registry(&self) -> bool {
        matches!(
            self,
            InstallOutcome::Registered { .. } | InstallOutcome::Escalated { .. }
        )
    }
}

/// Second phase of a provider run: install if the session asked for it.
///
/// Runs at most once per session; later calls report
/// [`InstallOutcome::AlreadyCompleted`].
pub fn finalize_install_if_requested(session: &mut Session<'_>) -> Result<InstallOutcome> {
    if !session.install_requested() {
        return Ok(InstallOutcome::NotRequested);
    }
    if session.install_completed() {
        return Ok(InstallOutcome::AlreadyCompleted);
    }

    let system = session
        .system()
        .cloned()
        .ok_or(SysCfgError::SystemNotDeclared)?;
    let provider = session
        .origin()
        .map(Path::to_path_buf)
        .ok_or_else(|| SysCfgError::InstallNotPermitted {
            system: system.to_string(),
        })?;

    let outcome = Installer::new(session.host()).install(&system, &provider)?;
    session.mark_install_completed();
    Ok(outcome)
}

/// Registers providers with the host's package registry.
pub struct Installer<'a> {
    host: &'a Host,
}

impl<'a> Installer<'a> {
    pub fn new(host: &'a Host) -> Self {
        Installer { host }
    }

    /// Install the provider file at `provider` for `system`.
    pub fn install(&self, system: &SystemName, provider: &Path) -> Result<InstallOutcome> {
        let identity = system.package_identity();
        let location = provider.parent().unwrap_or(Path::new(".")).to_path_buf();

        if let Some(existing) = self.host.registry().resolve(&identity)? {
            if same_location(&existing, &location) {
                debug!("{}: already installed at {}", system, existing.display());
                return Ok(InstallOutcome::AlreadyInstalled { location: existing });
            }
            return Err(SysCfgError::RegistrationConflict {
                system: system.to_string(),
                identity,
                registered: existing,
                requested: location,
            });
        }

        let settings = self.host.install_settings();
        match self.host.mode() {
            HostMode::Project => {
                if !settings.allow_install {
                    return Err(SysCfgError::InstallNotPermitted {
                        system: system.to_string(),
                    });
                }
                self.register(system, provider, &identity, location)
            }
            HostMode::Script if settings.direct_registration => {
                self.register(system, provider, &identity, location)
            }
            HostMode::Script => {
                if !system.names_provider(provider) {
                    return Err(SysCfgError::FilenameMismatch {
                        system: system.to_string(),
                        found: provider
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        expected: system.provider_file_name(),
                    });
                }

                escalate::escalate_install(self.host, system, provider)?;
                self.confirm_registered(system, &identity, &location)?;
                debug!("{}: installed {} at {}", system, identity, location.display());
                Ok(InstallOutcome::Escalated { location })
            }
        }
    }

    fn register(
        &self,
        system: &SystemName,
        provider: &Path,
        identity: &str,
        location: PathBuf,
    ) -> Result<InstallOutcome> {
        if !system.names_provider(provider) {
            warn!(
                "{}: provider is not named {}; consumers will not be able to load it",
                system,
                system.provider_file_name()
            );
        }

        match self.host.registry().register(identity, &location)? {
            RegisterOutcome::Registered => {
                debug!("{}: installed {} at {}", system, identity, location.display());
                Ok(InstallOutcome::Registered { location })
            }
            RegisterOutcome::AlreadyRegistered => {
                debug!("{}: already installed at {}", system, location.display());
                Ok(InstallOutcome::AlreadyInstalled { location })
            }
            RegisterOutcome::Conflict(existing) => Err(SysCfgError::RegistrationConflict {
                system: system.to_string(),
                identity: identity.to_string(),
                registered: existing,
                requested: location,
            }),
        }
    }

    fn confirm_registered(&self, system: &SystemName, identity: &str, location: &Path) -> Result<()> {
        match self.host.registry().resolve(identity)? {
            Some(found) if same_location(&found, location) => Ok(()),
            Some(found) => Err(SysCfgError::RegistrationConflict {
                system: system.to_string(),
                identity: identity.to_string(),
                registered: found,
                requested: location.to_path_buf(),
            }),
            None => Err(SysCfgError::InstallSubprocessFailed {
                system: system.to_string(),
                command: self.host.install_settings().host_program.display().to_string(),
                code: Some(0),
                output: format!("the installer finished but {} is still not registered", identity),
            }),
        }
    }
}
