//! `syscfg configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::GlobalOptions;
use syscfg::core::{DeclareOutcome, HostMode};
use syscfg::ops::{configure, ConfigureOptions, InstallOutcome};
use syscfg::util::Status;

pub fn execute(args: ConfigureArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;

    let host = ctx.host(HostMode::Project, args.allow_install);
    let mut store = ctx.open_store()?;

    let manifest = match args.path {
        Some(path) if path.is_absolute() => path,
        Some(path) => ctx.cwd().join(path),
        None => ctx.cwd().to_path_buf(),
    };

    let report = configure(
        &host,
        &mut store,
        &ConfigureOptions {
            manifest,
            install_all: args.install_as_symlink,
        },
    )?;

    for provider in &report.providers {
        shell.status(
            Status::Declared,
            format!("{} from {}", provider.system, provider.path.display()),
        );
        let identity = provider.system.package_identity();
        match &provider.install {
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
    }

    for (key, outcome) in &report.declared {
        match outcome {
            DeclareOutcome::Created | DeclareOutcome::Unchanged => {
                shell.status(Status::Declared, key);
            }
            DeclareOutcome::Kept { existing } => {
                shell.warn(format!("{} keeps its existing value {:?}", key, existing));
            }
        }
    }

    for (key, value) in &report.values {
        shell.print(format!("{}={}", key, value));
    }

    shell.status(Status::Configured, &report.project);
    Ok(())
}
