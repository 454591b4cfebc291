//! `syscfg run` command

use anyhow::Result;

use crate::cli::RunArgs;
use crate::GlobalOptions;
use syscfg::core::HostMode;
use syscfg::ops::{resolve_provider_path, run_provider, InstallOutcome, RunOptions, UninstallOutcome};
use syscfg::util::Status;

pub fn execute(args: RunArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;

    let host = ctx.host(HostMode::Script, false);
    let mut store = ctx.open_store()?;
    let provider = resolve_provider_path(ctx.cwd(), &args.provider);

    let opts = RunOptions {
        provider: provider.clone(),
        install: args.install_as_symlink,
        uninstall: args.uninstall,
    };

    // Escalated installs wait on a child process.
    let spinner = (opts.install && !host.install_settings().direct_registration)
        .then(|| shell.spinner(Status::Installing, provider.display()));
    let result = run_provider(&host, &mut store, &opts);
    drop(spinner);
    let report = result?;

    shell.status(
        Status::Declared,
        format!(
            "{} ({} variables) from {}",
            report.system,
            report.variables.len(),
            report.provider.display()
        ),
    );
    for (identity, value) in &report.variables {
        shell.status(Status::Info, format!("{} = {:?}", identity, value));
    }

    let identity = report.system.package_identity();
    match &report.install {
        InstallOutcome::Registered { location } | InstallOutcome::Escalated { location } => {
            shell.status(
                Status::Installed,
                format!("{} at {}", identity, location.display()),
            );
        }
        InstallOutcome::AlreadyInstalled { location } => {
            shell.status(
                Status::Skipped,
                format!("{} is already installed at {}", identity, location.display()),
            );
        }
        InstallOutcome::NotRequested | InstallOutcome::AlreadyCompleted => {}
    }

    match &report.uninstall {
        Some(UninstallOutcome::Removed { record }) => {
            shell.status(Status::Removed, format!("{} ({})", identity, record));
        }
        Some(UninstallOutcome::NotInstalled) => {
            shell.warn(format!("{} is not installed", identity));
        }
        None => {}
    }

    Ok(())
}
