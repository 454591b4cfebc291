//! Test fixtures for provider directories and hosts.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::host::{Host, HostMode, InstallSettings, MapEnv};
use crate::registry::{Platform, UserRegistry};

/// A scratch area with a home directory and a provider directory.
pub struct ProviderFixture {
    pub tmp: TempDir,
    pub home: PathBuf,
    pub provider_dir: PathBuf,
}

impl ProviderFixture {
    /// Create the fixture with an `EXAMPLE` provider setting `VARIABLE_A`.
    pub fn example() -> Self {
        let fixture = Self::empty();
        fixture.write_provider(
            "SysCfgEXAMPLEConfig.toml",
            "system = \"example\"\n\n[variables]\nvariable_a = \"foo\"\n",
        );
        fixture
    }

    /// Create the fixture without any provider file.
    pub fn empty() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let home = tmp.path().join("home");
        let provider_dir = tmp.path().join("providers").join("example");
        fs::create_dir_all(&home).expect("failed to create home");
        fs::create_dir_all(&provider_dir).expect("failed to create provider dir");
        ProviderFixture {
            tmp,
            home,
            provider_dir,
        }
    }

    /// Write a file into the provider directory and return its path.
    pub fn write_provider(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.provider_dir.join(name);
        fs::write(&path, contents).expect("failed to write provider");
        path
    }

    /// Path of the conventional `EXAMPLE` provider.
    pub fn example_provider(&self) -> PathBuf {
        self.provider_dir.join("SysCfgEXAMPLEConfig.toml")
    }

    /// A fresh build directory below the scratch area.
    pub fn build_dir(&self, name: &str) -> PathBuf {
        self.tmp.path().join("builds").join(name)
    }

    pub fn registry(&self) -> UserRegistry {
        UserRegistry::for_home(&self.home)
    }

    /// A Unix host using this fixture's home for registry and `HOME`.
    pub fn host(&self, mode: HostMode) -> Host {
        self.host_with(mode, MapEnv::new(), InstallSettings::default())
    }

    pub fn host_with(&self, mode: HostMode, env: MapEnv, install: InstallSettings) -> Host {
        Host::new(mode, Box::new(self.registry()))
            .with_platform(Platform::Unix)
            .with_env(env.with("HOME", self.home.display().to_string()))
            .with_install_settings(install)
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }
}
