//! `syscfg status` command

use anyhow::Result;

use crate::cli::StatusArgs;
use crate::GlobalOptions;
use syscfg::core::{HostMode, SystemName};
use syscfg::ops::status;
use syscfg::util::Status;

pub fn execute(args: StatusArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;

    let host = ctx.host(HostMode::Script, false);
    let store = ctx.open_store()?;
    let system = SystemName::parse(&args.system)?;

    let report = status(&host, &store, &system)?;

    if shell.is_json() {
        shell.json_value(&serde_json::to_value(&report)?);
        return Ok(());
    }

    match &report.location {
        Some(location) => {
            shell.status(
                Status::Installed,
                format!("{} at {}", report.identity, location.display()),
            );
            match &report.provider {
                Some(provider) => shell.note(format!("provider {}", provider.display())),
                None => shell.warn(format!(
                    "{} is missing from {}",
                    system.provider_file_name(),
                    location.display()
                )),
            }
        }
        None => shell.status(Status::Skipped, format!("{} is not installed", report.identity)),
    }
    shell.note(format!("record {}", report.record));

    for cached in &report.cached {
        shell.print(format!("{}={}", cached.identity, cached.value));
    }

    Ok(())
}
