//! High-level operations.
//!
//! This module contains the implementation of syscfg commands.

pub mod configure;
pub mod escalate;
pub mod install;
pub mod run;
pub mod status;
pub mod uninstall;

pub use configure::{configure, ConfigureOptions, ConfigureReport, ProviderReport};
pub use install::{finalize_install_if_requested, InstallOutcome, Installer};
pub use run::{resolve_provider_path, run_provider, RunOptions, RunReport};
pub use status::{status, CachedValue, StatusReport};
pub use uninstall::{UninstallOutcome, Uninstaller};
