//! `syscfg get` command
//!
//! Reads variables as a consumer and prints them as `KEY=value`, one per line.

use anyhow::Result;

use crate::cli::GetArgs;
use crate::GlobalOptions;
use syscfg::core::{ExecutionMode, HostMode, Session};

pub fn execute(args: GetArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;

    let host = ctx.host(HostMode::Script, false);
    let mut store = ctx.open_script_store()?;

    let mut session = Session::new(&host, &mut store, ExecutionMode::Consumer);
    session.declare_system(&args.system)?;

    for key in &args.keys {
        let value = session.get(key)?;
        shell.print(format!("{}={}", key, value));
    }

    Ok(())
}
