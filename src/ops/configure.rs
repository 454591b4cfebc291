//! Implementation of `syscfg configure`.
//!
//! Evaluates a project manifest in project mode: every listed provider first,
//! each in its own provider session, then the project itself as a consumer of
//! its System.

use std::path::PathBuf;

use tracing::info;

use crate::core::error::Result;
use crate::core::host::Host;
use crate::core::identifier::SystemName;
use crate::core::project::ProjectManifest;
use crate::core::provider::ProviderFile;
use crate::core::session::{ExecutionMode, Session};
use crate::core::store::{DeclareOutcome, VariableStore};
use crate::ops::install::{finalize_install_if_requested, InstallOutcome};

/// Options for configuring a project.
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Path to `SysCfgProject.toml` or the directory containing it.
    pub manifest: PathBuf,

    /// Request installation of every provider, not only those marked
    /// `install = true`.
    pub install_all: bool,
}

/// Outcome of one evaluated provider.
#[derive(Debug, Clone)]
pub struct ProviderReport {
    pub system: SystemName,
    pub path: PathBuf,
    pub install: InstallOutcome,
}

/// Result of configuring a project.
#[derive(Debug, Clone, Default)]
pub struct ConfigureReport {
    pub project: String,
    pub providers: Vec<ProviderReport>,
    /// Values read by the project, as `(name, value)` in manifest order.
    pub values: Vec<(String, String)>,
    /// Values declared by the project.
    pub declared: Vec<(String, DeclareOutcome)>,
}

/// Configure the project at `opts.manifest`.
pub fn configure(
    host: &Host,
    store: &mut VariableStore,
    opts: &ConfigureOptions,
) -> Result<ConfigureReport> {
    let manifest_path = ProjectManifest::find(&opts.manifest);
    let manifest = ProjectManifest::load(&manifest_path)?;
    info!(
        "configuring {} ({})",
        manifest.project.name,
        manifest_path.display()
    );

    let mut report = ConfigureReport {
        project: manifest.project.name.clone(),
        ..ConfigureReport::default()
    };

    for entry in &manifest.providers {
        let provider = ProviderFile::load(&manifest.provider_path(entry))?;

        let mut session = Session::new(host, &mut *store, ExecutionMode::Provider);
        provider.evaluate(&mut session)?;
        if entry.install || opts.install_all {
            session.request_install();
        }
        let install = finalize_install_if_requested(&mut session)?;

        if let Some(system) = session.system() {
            report.providers.push(ProviderReport {
                system: system.clone(),
                path: provider.path().to_path_buf(),
                install,
            });
        }
    }

    if let Some(system) = &manifest.project.system {
        let mut session = Session::new(host, &mut *store, ExecutionMode::Consumer);
        session.declare_system(system)?;

        for key in &manifest.project.get {
            let value = session.get(key)?;
            report.values.push((key.clone(), value));
        }
        for (key, value) in &manifest.project.set {
            let outcome = session.set(key, value)?;
            report.declared.push((key.clone(), outcome));
        }
    }

    Ok(report)
}
