//! Installation through a child project-mode run.
//!
//! When the current invocation cannot write the registry itself, a throwaway
//! project manifest is written next to the provider and the host tool is run
//! on it with `--allow-install`. Whatever the child leaves behind in the
//! provider directory is removed afterwards, whether it succeeded or not.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::error::{Result, SysCfgError};
use crate::core::host::Host;
use crate::core::identifier::SystemName;
use crate::core::project::MANIFEST_FILE_NAME;
use crate::util::fs::{write_atomic, DirSnapshot};
use crate::util::process::ProcessBuilder;

/// Build directory the child run uses, relative to the provider directory.
pub const INSTALL_BUILD_DIR: &str = ".syscfg-install";

const SYSTEM_PLACEHOLDER: &str = "@SYSTEM@";

const INSTALL_TEMPLATE: &str = r#"# Generated by syscfg to install @SYSTEM@; removed when the install finishes.
[project]
name = "SysCfg@SYSTEM@Install"

[[provider]]
path = "SysCfg@SYSTEM@Config.toml"
install = true
"#;

/// The throwaway manifest that installs `system`'s provider.
pub fn install_manifest(system: &SystemName) -> String {
    INSTALL_TEMPLATE.replace(SYSTEM_PLACEHOLDER, system.as_str())
}

/// Command line of the child run for the provider directory `dir`.
pub fn install_command(host: &Host, dir: &Path) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(&host.install_settings().host_program)
        .arg("configure")
        .arg(dir)
        .arg("--build-dir")
        .arg(dir.join(INSTALL_BUILD_DIR))
        .arg("--allow-install")
        .cwd(dir);

    // The child must see the same registry as this process.
    if let Some(home) = host.env().var("HOME") {
        cmd = cmd.env("HOME", home);
    }
    cmd
}

/// Install `provider` for `system` by running the host tool in project mode.
///
/// Succeeds when the child exits with status 0; the caller verifies the
/// registry afterwards.
pub fn escalate_install(host: &Host, system: &SystemName, provider: &Path) -> Result<()> {
    let dir = provider.parent().unwrap_or(Path::new("."));
    let manifest = dir.join(MANIFEST_FILE_NAME);
    if manifest.exists() {
        return Err(SysCfgError::invalid_file(
            &manifest,
            "refusing to overwrite an existing project manifest while installing",
        ));
    }

    let snapshot = DirSnapshot::capture(dir)?;
    write_atomic(&manifest, &install_manifest(system))?;

    let cmd = install_command(host, dir);
    info!("{}: installing through `{}`", system, cmd.display_command());
    let result = host.executor().exec(&cmd);

    match snapshot.remove_new_entries() {
        Ok(removed) => {
            for path in removed {
                debug!("removed {}", path.display());
            }
        }
        Err(e) => warn!("{}: failed to clean up after install: {}", system, e),
    }

    let output = result.map_err(|e| SysCfgError::InstallSubprocessFailed {
        system: system.to_string(),
        command: cmd.display_command(),
        code: None,
        output: format!("{:#}", e),
    })?;

    if !output.success() {
        return Err(SysCfgError::InstallSubprocessFailed {
            system: system.to_string(),
            command: cmd.display_command(),
            code: output.code,
            output: output.combined(),
        });
    }

    debug!("install child output:\n{}", output.combined());
    Ok(())
}
