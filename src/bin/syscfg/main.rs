//! syscfg CLI - a shared configuration registry for build projects

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use syscfg::util::{GlobalContext, Shell};

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub verbose: bool,
    pub build_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Build the invocation's context from the process environment.
    pub fn context(&self) -> Result<GlobalContext> {
        let mut ctx = GlobalContext::new()?;
        ctx.set_verbose(self.verbose);
        ctx.set_build_dir(self.build_dir.clone());
        Ok(ctx)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("syscfg=debug")
        } else if cli.quiet {
            EnvFilter::new("syscfg=error")
        } else {
            EnvFilter::new("syscfg=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json = matches!(&cli.command, Commands::Status(args) if args.json);
    let global_opts = GlobalOptions {
        shell: Shell::from_flags(cli.quiet, cli.verbose, cli.color, json),
        verbose: cli.verbose,
        build_dir: cli.build_dir,
    };

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &global_opts),
        Commands::Configure(args) => commands::configure::execute(args, &global_opts),
        Commands::Get(args) => commands::get::execute(args, &global_opts),
        Commands::Status(args) => commands::status::execute(args, &global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
