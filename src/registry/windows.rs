//! Package registry stored in the Windows user registry hive.
//!
//! All access goes through `reg.exe`, one key per identity with one
//! `REG_SZ` value per recorded location.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::core::error::{Result, SysCfgError};
use crate::registry::{location_hash, same_location, PackageRegistry, RegisterOutcome};
use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

/// Parent key of every package record.
pub const PACKAGES_KEY: &str = r"HKCU\Software\Syscfg\Syscfg\Packages";

/// Program used to query and edit the registry.
pub const REG_PROGRAM: &str = "reg";

/// Full key for `identity`.
pub fn package_key(identity: &str) -> String {
    format!(r"{}\{}", PACKAGES_KEY, identity)
}

/// Extract `REG_SZ` values from `reg query` output.
pub fn parse_query_values(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| line.split_once("REG_SZ"))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Registry client backed by `reg.exe`.
pub struct WindowsRegistry {
    executor: Arc<dyn Executor>,
}

impl WindowsRegistry {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        WindowsRegistry { executor }
    }

    fn reg(&self, args: &[&str]) -> Result<ProcessOutput> {
        let cmd = ProcessBuilder::new(REG_PROGRAM).args(args);
        self.executor.exec(&cmd).map_err(|e| {
            SysCfgError::io(
                format!("failed to run `{}`", cmd.display_command()),
                std::io::Error::other(format!("{:#}", e)),
            )
        })
    }
}

impl PackageRegistry for WindowsRegistry {
    fn register(&self, identity: &str, location: &Path) -> Result<RegisterOutcome> {
        if let Some(existing) = self.resolve(identity)? {
            if same_location(&existing, location) {
                return Ok(RegisterOutcome::AlreadyRegistered);
            }
            return Ok(RegisterOutcome::Conflict(existing));
        }

        let key = package_key(identity);
        let value_name = location_hash(location);
        let data = location.display().to_string();
        let output = self.reg(&["add", &key, "/v", &value_name, "/t", "REG_SZ", "/d", &data, "/f"])?;
        if !output.success() {
            return Err(SysCfgError::io(
                format!("failed to write registry key {}", key),
                std::io::Error::other(output.combined()),
            ));
        }

        debug!("registered {} -> {}", identity, data);
        Ok(RegisterOutcome::Registered)
    }

    fn resolve(&self, identity: &str) -> Result<Option<PathBuf>> {
        let output = self.reg(&["query", &package_key(identity)])?;
        if !output.success() {
            return Ok(None);
        }
        Ok(parse_query_values(&output.stdout)
            .into_iter()
            .find(|location| location.is_dir()))
    }

    fn unregister(&self, identity: &str) -> Result<bool> {
        let key = package_key(identity);
        if !self.reg(&["query", &key])?.success() {
            return Ok(false);
        }
        let output = self.reg(&["delete", &key, "/f"])?;
        if !output.success() {
            return Err(SysCfgError::io(
                format!("failed to delete registry key {}", key),
                std::io::Error::other(output.combined()),
            ));
        }
        debug!("unregistered {}", identity);
        Ok(true)
    }

    fn record_location(&self, identity: &str) -> String {
        package_key(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};
    use tempfile::TempDir;

    #[test]
    fn test_package_key() {
        assert_eq!(
            package_key("SysCfgEXAMPLE"),
            r"HKCU\Software\Syscfg\Syscfg\Packages\SysCfgEXAMPLE"
        );
    }

    #[test]
    fn test_parse_query_values() {
        let stdout = "\r\nHKEY_CURRENT_USER\\Software\\Syscfg\\Syscfg\\Packages\\SysCfgEXAMPLE\r\n    0f1e2d    REG_SZ    C:\\Program Files\\example\r\n\r\n";
        assert_eq!(
            parse_query_values(stdout),
            vec![PathBuf::from("C:\\Program Files\\example")]
        );
        assert!(parse_query_values("").is_empty());
    }

    #[test]
    fn test_resolve_missing_key() {
        let executor = Arc::new(MockExecutor::new());
        executor.expect_prefix("reg query", MockProcessOutput::failure(1, "ERROR: not found"));

        let registry = WindowsRegistry::new(executor.clone());
        assert_eq!(registry.resolve("SysCfgEXAMPLE").unwrap(), None);
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn test_resolve_existing_location() {
        let tmp = TempDir::new().unwrap();
        let stdout = format!("    abc    REG_SZ    {}\n", tmp.path().display());

        let executor = Arc::new(MockExecutor::new());
        executor.expect_prefix("reg query", MockProcessOutput::success(stdout));

        let registry = WindowsRegistry::new(executor);
        assert_eq!(
            registry.resolve("SysCfgEXAMPLE").unwrap(),
            Some(tmp.path().to_path_buf())
        );
    }

    #[test]
    fn test_register_writes_value() {
        let tmp = TempDir::new().unwrap();
        let executor = Arc::new(MockExecutor::new());
        executor.expect_prefix("reg query", MockProcessOutput::failure(1, ""));
        executor.expect_prefix("reg add", MockProcessOutput::success(""));

        let registry = WindowsRegistry::new(executor.clone());
        assert_eq!(
            registry.register("SysCfgEXAMPLE", tmp.path()).unwrap(),
            RegisterOutcome::Registered
        );

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with(r"reg add HKCU\Software\Syscfg\Syscfg\Packages\SysCfgEXAMPLE /v "));
        assert!(calls[1].ends_with("/f"));
    }

    #[test]
    fn test_unregister_missing_key_is_noop() {
        let executor = Arc::new(MockExecutor::new());
        executor.expect_prefix("reg query", MockProcessOutput::failure(1, ""));

        let registry = WindowsRegistry::new(executor.clone());
        assert!(!registry.unregister("SysCfgEXAMPLE").unwrap());
        assert_eq!(executor.calls().len(), 1);
    }
}
