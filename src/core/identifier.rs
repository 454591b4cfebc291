//! Identifier normalization for System names and Variable keys.
//!
//! Both kinds of identifier share one grammar: a non-empty run of ASCII
//! letters and underscores. Accepted identifiers are stored uppercase, so
//! `example` and `EXAMPLE` name the same System.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SysCfgError};

/// Prefix that turns a System name into a package identity.
pub const PACKAGE_PREFIX: &str = "SysCfg";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]+$").expect("identifier pattern is valid")
});

/// Validate `raw` and return its uppercase form.
pub fn normalize(raw: &str) -> Result<String> {
    if IDENTIFIER.is_match(raw) {
        Ok(raw.to_ascii_uppercase())
    } else {
        Err(SysCfgError::InvalidIdentifier {
            raw: raw.to_string(),
        })
    }
}

/// A normalized System name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemName(String);

impl SystemName {
    /// Parse and normalize a System name.
    pub fn parse(raw: &str) -> Result<Self> {
        normalize(raw).map(SystemName)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The package identity used with the registry, e.g. `SysCfgEXAMPLE`.
    pub fn package_identity(&self) -> String {
        format!("{}{}", PACKAGE_PREFIX, self.0)
    }

    /// File name a provider for this System must carry to be installable.
    pub fn provider_file_name(&self) -> String {
        format!("{}Config.toml", self.package_identity())
    }

    /// Whether `path` is named like this System's provider file.
    pub fn names_provider(&self, path: &Path) -> bool {
        path.file_name() == Some(OsStr::new(&self.provider_file_name()))
    }

    /// Storage identity of `key` within this System.
    pub fn identity(&self, key: &VariableKey) -> Identity {
        Identity(format!("{}_{}", self.0, key.0))
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SystemName {
    type Error = SysCfgError;

    fn try_from(raw: String) -> Result<Self> {
        SystemName::parse(&raw)
    }
}

impl From<SystemName> for String {
    fn from(name: SystemName) -> String {
        name.0
    }
}

/// A normalized Variable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableKey(String);

impl VariableKey {
    /// Parse and normalize a Variable key.
    pub fn parse(raw: &str) -> Result<Self> {
        normalize(raw).map(VariableKey)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable storage key of a Variable: `SYSTEM_KEY`.
///
/// The same string is the name of the environment variable that overrides
/// the stored value at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
