//! Removing a System's registration.
//!
//! Uninstalling deletes the single registry record for `SysCfg<SYSTEM>`: the
//! per-identity directory below `$HOME/.syscfg/packages` on Unix, or the
//! per-identity key on Windows. It is only offered when a provider is run
//! directly.

use tracing::{debug, warn};

use crate::core::error::{Result, SysCfgError};
use crate::core::host::{Host, HostMode};
use crate::core::identifier::SystemName;
use crate::registry::Platform;

/// What an uninstall request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Nothing was registered; reported as a warning.
    NotInstalled,
    /// The record at `record` was removed.
    Removed { record: String },
}

/// Removes registrations from the host's package registry.
pub struct Uninstaller<'a> {
    host: &'a Host,
}

impl<'a> Uninstaller<'a> {
    pub fn new(host: &'a Host) -> Self {
        Uninstaller { host }
    }

    pub fn uninstall(&self, system: &SystemName) -> Result<UninstallOutcome> {
        if self.host.mode() != HostMode::Script {
            return Err(SysCfgError::UninstallNotPermitted {
                system: system.to_string(),
            });
        }

        let identity = system.package_identity();
        let registry = self.host.registry();

        match self.host.platform() {
            Platform::Windows => {}
            Platform::Unix => {
                self.require_home(system)?;
                if registry.resolve(&identity)?.is_none() {
                    warn!("{}: {} is not installed", system, identity);
                    return Ok(UninstallOutcome::NotInstalled);
                }
            }
            Platform::Other(platform) => {
                return Err(SysCfgError::UnsupportedPlatform {
                    system: system.to_string(),
                    platform: platform.to_string(),
                });
            }
        }

        let record = registry.record_location(&identity);
        let removed = registry
            .unregister(&identity)
            .map_err(|e| uninstall_failed(system, &e))?;
        if !removed {
            warn!("{}: {} is not installed", system, identity);
            return Ok(UninstallOutcome::NotInstalled);
        }

        debug!("{}: removed {}", system, record);
        Ok(UninstallOutcome::Removed { record })
    }

    /// The Unix registry lives below `HOME`, so an unset `HOME` is fatal.
    fn require_home(&self, system: &SystemName) -> Result<()> {
        match self.host.env().var("HOME") {
            Some(home) if !home.is_empty() => Ok(()),
            _ => Err(SysCfgError::HomeNotSet {
                system: system.to_string(),
            }),
        }
    }
}

fn uninstall_failed(system: &SystemName, err: &SysCfgError) -> SysCfgError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    SysCfgError::UninstallFailed {
        system: system.to_string(),
        message,
    }
}
