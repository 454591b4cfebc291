//! CLI integration tests for syscfg.
//!
//! These tests drive the binary through the whole lifecycle: declaring a
//! System from a provider, installing it, reading it from fresh invocations
//! and uninstalling it again. Every test uses its own `HOME`, so the package
//! registry lives in a temporary directory.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const EXAMPLE_PROVIDER: &str = "system = \"example\"\n\n[variables]\nvariable_a = \"foo\"\n";

/// A scratch home, a provider directory and a working directory.
struct Sandbox {
    tmp: TempDir,
    home: PathBuf,
    providers: PathBuf,
    work: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let providers = tmp.path().join("providers");
        let work = tmp.path().join("work");
        for dir in [&home, &providers, &work] {
            fs::create_dir_all(dir).unwrap();
        }
        Sandbox {
            tmp,
            home,
            providers,
            work,
        }
    }

    /// Sandbox with the `EXAMPLE` provider written.
    fn with_example() -> Self {
        let sandbox = Self::new();
        fs::write(sandbox.example_provider(), EXAMPLE_PROVIDER).unwrap();
        sandbox
    }

    fn example_provider(&self) -> PathBuf {
        self.providers.join("SysCfgEXAMPLEConfig.toml")
    }

    /// A build directory that no earlier invocation has used.
    fn fresh_build_dir(&self, name: &str) -> PathBuf {
        self.tmp.path().join("builds").join(name)
    }

    /// The syscfg binary, isolated from the caller's environment.
    fn syscfg(&self) -> Command {
        let mut cmd = Command::cargo_bin("syscfg").unwrap();
        cmd.current_dir(&self.work)
            .env("HOME", &self.home)
            .env_remove("SYSCFG_BUILD_DIR")
            .env_remove("RUST_LOG")
            .env_remove("EXAMPLE_VARIABLE_A");
        cmd
    }

    fn registry_dir(&self) -> PathBuf {
        self.home.join(".syscfg/packages/SysCfgEXAMPLE")
    }
}

fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_install_get_uninstall_lifecycle() {
    let sandbox = Sandbox::with_example();

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .arg("--build-dir")
        .arg(sandbox.fresh_build_dir("install"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Installed"));
    assert!(sandbox.registry_dir().is_dir());

    sandbox
        .syscfg()
        .args(["get", "example", "variable_a", "--build-dir"])
        .arg(sandbox.fresh_build_dir("consumer"))
        .assert()
        .success()
        .stdout("variable_a=foo\n");

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--uninstall")
        .arg("--build-dir")
        .arg(sandbox.fresh_build_dir("uninstall"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));
    assert!(!sandbox.registry_dir().exists());

    sandbox
        .syscfg()
        .args(["get", "EXAMPLE", "VARIABLE_A", "--build-dir"])
        .arg(sandbox.fresh_build_dir("after"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("EXAMPLE: variable `VARIABLE_A` is not defined"));
}

#[test]
fn test_get_after_uninstall_from_same_directory_fails() {
    let sandbox = Sandbox::with_example();

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success();

    sandbox
        .syscfg()
        .args(["get", "example", "variable_a"])
        .assert()
        .success()
        .stdout("variable_a=foo\n");

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--uninstall")
        .assert()
        .success();

    sandbox
        .syscfg()
        .args(["get", "example", "variable_a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EXAMPLE: variable `VARIABLE_A` is not defined"));
}

#[test]
fn test_install_is_reported_once() {
    let sandbox = Sandbox::with_example();

    let output = sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("SysCfgEXAMPLE at").count(), 1, "{stderr}");
}

#[test]
fn test_second_install_is_a_noop() {
    let sandbox = Sandbox::with_example();

    for name in ["first", "second"] {
        sandbox
            .syscfg()
            .arg("run")
            .arg(sandbox.example_provider())
            .arg("--install-as-symlink")
            .arg("--build-dir")
            .arg(sandbox.fresh_build_dir(name))
            .assert()
            .success();
    }

    assert_eq!(dir_listing(&sandbox.registry_dir()).len(), 1);
}

#[test]
fn test_install_from_other_location_conflicts() {
    let sandbox = Sandbox::with_example();
    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success();

    let other = sandbox.tmp.path().join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("SysCfgEXAMPLEConfig.toml"), EXAMPLE_PROVIDER).unwrap();

    sandbox
        .syscfg()
        .arg("run")
        .arg(other.join("SysCfgEXAMPLEConfig.toml"))
        .arg("--install-as-symlink")
        .arg("--build-dir")
        .arg(sandbox.fresh_build_dir("other"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn test_install_and_uninstall_together_fail() {
    let sandbox = Sandbox::with_example();

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .args(["--install-as-symlink", "--uninstall"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be requested together"));
    assert!(!sandbox.registry_dir().exists());
}

#[test]
fn test_uninstall_when_not_installed_warns() {
    let sandbox = Sandbox::with_example();

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--uninstall")
        .assert()
        .success()
        .stderr(predicate::str::contains("not installed"));
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn test_environment_overrides_stored_value() {
    let sandbox = Sandbox::with_example();
    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success();

    sandbox
        .syscfg()
        .args(["get", "example", "variable_a", "--build-dir"])
        .arg(sandbox.fresh_build_dir("env"))
        .env("EXAMPLE_VARIABLE_A", "bar")
        .assert()
        .success()
        .stdout("variable_a=bar\n");
}

#[test]
fn test_get_rejects_invalid_identifier() {
    let sandbox = Sandbox::new();

    sandbox
        .syscfg()
        .args(["get", "exa-mple", "variable_a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid identifier `exa-mple`"));
}

#[test]
fn test_configure_consumer_project() {
    let sandbox = Sandbox::with_example();
    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success();

    fs::write(
        sandbox.work.join("SysCfgProject.toml"),
        "[project]\nname = \"consumer\"\nsystem = \"example\"\nget = [\"variable_a\"]\n",
    )
    .unwrap();

    sandbox
        .syscfg()
        .arg("configure")
        .arg("--build-dir")
        .arg(sandbox.fresh_build_dir("configure"))
        .assert()
        .success()
        .stdout(predicate::str::contains("variable_a=foo"));
}

#[test]
fn test_configure_install_requires_permission() {
    let sandbox = Sandbox::with_example();
    fs::write(
        sandbox.work.join("SysCfgProject.toml"),
        format!(
            "[project]\nname = \"installer\"\n\n[[provider]]\npath = \"{}\"\ninstall = true\n",
            sandbox.example_provider().display()
        ),
    )
    .unwrap();

    sandbox
        .syscfg()
        .arg("configure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to install"));
    assert!(!sandbox.registry_dir().exists());
}

// ============================================================================
// Escalation
// ============================================================================

#[test]
fn test_escalated_install_leaves_provider_directory_untouched() {
    let sandbox = Sandbox::with_example();
    fs::create_dir_all(sandbox.work.join(".syscfg")).unwrap();
    fs::write(
        sandbox.work.join(".syscfg/config.toml"),
        "[install]\ndirect-registration = false\n",
    )
    .unwrap();
    let before = dir_listing(&sandbox.providers);

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success()
        .stderr(predicate::str::contains("Installed"));

    assert_eq!(dir_listing(&sandbox.providers), before);
    assert!(sandbox.registry_dir().is_dir());

    sandbox
        .syscfg()
        .args(["get", "example", "variable_a", "--build-dir"])
        .arg(sandbox.fresh_build_dir("escalated"))
        .assert()
        .success()
        .stdout("variable_a=foo\n");
}

#[test]
fn test_escalation_requires_conventional_file_name() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.providers.join("example.toml"), EXAMPLE_PROVIDER).unwrap();
    fs::create_dir_all(sandbox.work.join(".syscfg")).unwrap();
    fs::write(
        sandbox.work.join(".syscfg/config.toml"),
        "[install]\ndirect-registration = false\n",
    )
    .unwrap();

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.providers.join("example.toml"))
        .arg("--install-as-symlink")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SysCfgEXAMPLEConfig.toml"));
}

// ============================================================================
// Status and completions
// ============================================================================

#[test]
fn test_status_json() {
    let sandbox = Sandbox::with_example();

    let output = sandbox
        .syscfg()
        .args(["status", "example", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["identity"], "SysCfgEXAMPLE");
    assert!(report["location"].is_null());

    sandbox
        .syscfg()
        .arg("run")
        .arg(sandbox.example_provider())
        .arg("--install-as-symlink")
        .assert()
        .success();

    let output = sandbox
        .syscfg()
        .args(["status", "example", "--json"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["location"].is_string());
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("syscfg")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("syscfg"));
}
