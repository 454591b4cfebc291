//! Implementation of `syscfg run`.
//!
//! Evaluates one provider file in script mode, then performs the requested
//! lifecycle action: installation, uninstallation, or neither.

use std::path::{Path, PathBuf};

use crate::core::error::{Result, SysCfgError};
use crate::core::host::Host;
use crate::core::identifier::SystemName;
use crate::core::provider::ProviderFile;
use crate::core::session::{ExecutionMode, Session};
use crate::core::store::VariableStore;
use crate::ops::install::{finalize_install_if_requested, InstallOutcome};
use crate::ops::uninstall::{UninstallOutcome, Uninstaller};

/// Options for running a provider.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Provider file to evaluate.
    pub provider: PathBuf,

    /// Install the provider after evaluating it (`--install-as-symlink`).
    pub install: bool,

    /// Remove the System's registration (`--uninstall`).
    pub uninstall: bool,
}

/// Result of running a provider.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub system: SystemName,
    pub provider: PathBuf,
    /// Every stored entry of the System after evaluation.
    pub variables: Vec<(String, String)>,
    pub install: InstallOutcome,
    pub uninstall: Option<UninstallOutcome>,
}

/// Evaluate the provider at `opts.provider` against `store`.
pub fn run_provider(host: &Host, store: &mut VariableStore, opts: &RunOptions) -> Result<RunReport> {
    if opts.install && opts.uninstall {
        return Err(SysCfgError::InstallUninstallConflict);
    }

    let provider = ProviderFile::load(&opts.provider)?;

    let mut session = Session::new(host, store, ExecutionMode::Provider);
    provider.evaluate(&mut session)?;
    if opts.install {
        session.request_install();
    }
    let install = finalize_install_if_requested(&mut session)?;
    let system = session
        .system()
        .cloned()
        .ok_or(SysCfgError::SystemNotDeclared)?;

    let uninstall = if opts.uninstall {
        Some(Uninstaller::new(host).uninstall(&system)?)
    } else {
        None
    };

    let variables = store
        .entries_for(&system)
        .map(|(identity, value)| (identity.to_string(), value.to_string()))
        .collect();

    Ok(RunReport {
        system,
        provider: provider.path().to_path_buf(),
        variables,
        install,
        uninstall,
    })
}

/// Provider path as given, relative to `cwd` when not absolute.
pub fn resolve_provider_path(cwd: &Path, provider: &Path) -> PathBuf {
    if provider.is_absolute() {
        provider.to_path_buf()
    } else {
        cwd.join(provider)
    }
}
