//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use syscfg::util::shell::ColorChoice;

/// syscfg - share configuration between independent build projects
#[derive(Parser)]
#[command(name = "syscfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors and requested values
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Directory holding the variable cache (default: .syscfg-build)
    #[arg(long, global = true, env = "SYSCFG_BUILD_DIR", value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a provider file, optionally installing or uninstalling it
    Run(RunArgs),

    /// Evaluate a SysCfgProject.toml
    Configure(ConfigureArgs),

    /// Read variables of an installed System
    Get(GetArgs),

    /// Show how a System is registered
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Provider file (SysCfg<SYSTEM>Config.toml)
    pub provider: PathBuf,

    /// Register the provider so other projects can find it
    #[arg(long)]
    pub install_as_symlink: bool,

    /// Remove the System's registration
    #[arg(long)]
    pub uninstall: bool,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Project manifest or the directory containing it
    pub path: Option<PathBuf>,

    /// Install every provider listed in the manifest
    #[arg(long)]
    pub install_as_symlink: bool,

    /// Allow providers of this project to install
    #[arg(long, hide = true)]
    pub allow_install: bool,
}

#[derive(Args)]
pub struct GetArgs {
    /// System name
    pub system: String,

    /// Variable keys to read
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// System name
    pub system: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "syscfg",
            "run",
            "SysCfgEXAMPLEConfig.toml",
            "--install-as-symlink",
            "--build-dir",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.build_dir, Some(PathBuf::from("out")));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.provider, PathBuf::from("SysCfgEXAMPLEConfig.toml"));
                assert!(args.install_as_symlink);
                assert!(!args.uninstall);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_get_requires_keys() {
        assert!(Cli::try_parse_from(["syscfg", "get", "example"]).is_err());
        assert!(Cli::try_parse_from(["syscfg", "get", "example", "variable_a"]).is_ok());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["syscfg", "-q", "-v", "status", "example"]).is_err());
    }

    #[test]
    fn test_allow_install_is_accepted() {
        let cli = Cli::try_parse_from(["syscfg", "configure", ".", "--allow-install"]).unwrap();
        assert!(matches!(cli.command, Commands::Configure(ConfigureArgs { allow_install: true, .. })));
    }
}
