//! Error types for the registry protocol.
//!
//! Every failure is fatal for the current invocation. Messages carry the
//! System name as a prefix whenever it is known at the point of failure.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::session::Access;

/// Result alias used throughout the library.
pub type Result<T, E = SysCfgError> = std::result::Result<T, E>;

/// Error raised by the registry protocol and installation lifecycle.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum SysCfgError {
    #[error("invalid identifier `{raw}`: only letters and underscores are allowed")]
    #[diagnostic(code(syscfg::invalid_identifier))]
    InvalidIdentifier { raw: String },

    #[error("no system declared; declare the system name before reading or writing variables")]
    #[diagnostic(
        code(syscfg::system_not_declared),
        help("add `system = \"<NAME>\"` before any variable access")
    )]
    SystemNotDeclared,

    #[error("{system}: system already declared, cannot redeclare it as `{requested}`")]
    #[diagnostic(code(syscfg::system_name_conflict))]
    SystemNameConflict { system: String, requested: String },

    #[error("{system}: cannot {attempted} variables in a context that already {previous} variables")]
    #[diagnostic(
        code(syscfg::mode_violation),
        help("a consuming project either declares variables or reads them, never both")
    )]
    ModeViolation {
        system: String,
        attempted: Access,
        previous: Access,
    },

    #[error("{system}: `{name}` is already defined in the calling scope")]
    #[diagnostic(code(syscfg::already_defined))]
    AlreadyDefined { system: String, name: String },

    #[error("{system}: variable `{key}` is not defined")]
    #[diagnostic(
        code(syscfg::not_found),
        help("install the provider with `syscfg run <provider> --install-as-symlink`")
    )]
    NotFound { system: String, key: String },

    #[error(
        "{system}: package `{identity}` is already registered at `{}`, refusing to register `{}`",
        registered.display(),
        requested.display()
    )]
    #[diagnostic(
        code(syscfg::registration_conflict),
        help("run `syscfg run <provider> --uninstall` from the registered provider first")
    )]
    RegistrationConflict {
        system: String,
        identity: String,
        registered: PathBuf,
        requested: PathBuf,
    },

    #[error("{system}: installation was requested but this project is not allowed to install")]
    #[diagnostic(code(syscfg::install_not_permitted))]
    InstallNotPermitted { system: String },

    #[error("{system}: provider file is named `{found}` but must be named `{expected}` to be installed")]
    #[diagnostic(code(syscfg::filename_mismatch))]
    FilenameMismatch {
        system: String,
        found: String,
        expected: String,
    },

    #[error("{system}: installer subprocess `{command}` failed with exit code {}\n{output}", format_code(*code))]
    #[diagnostic(code(syscfg::install_subprocess_failed))]
    InstallSubprocessFailed {
        system: String,
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{system}: uninstall is only available when running a provider directly")]
    #[diagnostic(
        code(syscfg::uninstall_not_permitted),
        help("use `syscfg run <provider> --uninstall`")
    )]
    UninstallNotPermitted { system: String },

    #[error("{system}: uninstall failed: {message}")]
    #[diagnostic(code(syscfg::uninstall_failed))]
    UninstallFailed { system: String, message: String },

    #[error("{system}: HOME is not set, cannot locate the package registry")]
    #[diagnostic(code(syscfg::home_not_set))]
    HomeNotSet { system: String },

    #[error("{system}: uninstall is not supported on platform `{platform}`")]
    #[diagnostic(code(syscfg::unsupported_platform))]
    UnsupportedPlatform { system: String, platform: String },

    #[error("`install-as-symlink` and `uninstall` cannot be requested together")]
    #[diagnostic(code(syscfg::install_uninstall_conflict))]
    InstallUninstallConflict,

    #[error("{message}")]
    #[diagnostic(code(syscfg::io))]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file `{}`: {message}", path.display())]
    #[diagnostic(code(syscfg::invalid_file))]
    InvalidFile { path: PathBuf, message: String },
}

impl SysCfgError {
    /// Wrap an I/O error with a message naming the operation.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        SysCfgError::Io {
            message: message.into(),
            source,
        }
    }

    /// Build an [`SysCfgError::InvalidFile`] for `path`.
    pub fn invalid_file(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SysCfgError::InvalidFile {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

fn format_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
