//! Implementation of `syscfg status`.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::host::Host;
use crate::core::identifier::SystemName;
use crate::core::store::VariableStore;

/// Registration state of one System.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub system: SystemName,
    /// Package identity, e.g. `SysCfgEXAMPLE`.
    pub identity: String,
    /// Where the registry record lives (directory or registry key).
    pub record: String,
    /// Registered provider directory, if any.
    pub location: Option<PathBuf>,
    /// Provider file inside `location`, if it exists.
    pub provider: Option<PathBuf>,
    /// Entries of this System in the current build directory's store.
    pub cached: Vec<CachedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedValue {
    pub identity: String,
    pub value: String,
}

impl StatusReport {
    pub fn is_installed(&self) -> bool {
        self.location.is_some()
    }
}

/// Report how `system` is registered and what the store holds for it.
pub fn status(host: &Host, store: &VariableStore, system: &SystemName) -> Result<StatusReport> {
    let identity = system.package_identity();
    let location = host.registry().resolve(&identity)?;
    let provider = location
        .as_ref()
        .map(|dir| dir.join(system.provider_file_name()))
        .filter(|path| path.is_file());

    let cached = store
        .entries_for(system)
        .map(|(identity, value)| CachedValue {
            identity: identity.to_string(),
            value: value.to_string(),
        })
        .collect();

    Ok(StatusReport {
        system: system.clone(),
        record: host.registry().record_location(&identity),
        identity,
        location,
        provider,
        cached,
    })
}
