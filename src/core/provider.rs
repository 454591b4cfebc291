//! Provider files.
//!
//! A provider declares one System and its variables:
//!
//! ```toml
//! system = "example"
//!
//! [variables]
//! variable_a = "foo"
//! db_host = "db.internal"
//!
//! [compose]
//! db_uri = { from = "db_host", template = "postgres://{}/app" }
//! ```
//!
//! `[compose]` entries read an already-declared variable and declare a new
//! one from it, which is only legal because providers bypass the guard. An
//! entry may read another compose entry; entries run after their sources.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{Result, SysCfgError};
use crate::core::identifier::normalize;
use crate::core::session::Session;
use crate::util::fs::read_to_string;

/// Placeholder replaced by the source value in a compose template.
pub const COMPOSE_PLACEHOLDER: &str = "{}";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderDocument {
    system: String,
    #[serde(default)]
    variables: BTreeMap<String, String>,
    #[serde(default)]
    compose: BTreeMap<String, ComposeEntry>,
}

/// A variable derived from another one of the same System.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComposeEntry {
    /// Key to read.
    pub from: String,
    /// Optional template; `{}` is replaced by the value read.
    #[serde(default)]
    pub template: Option<String>,
}

impl ComposeEntry {
    fn render(&self, value: &str) -> String {
        match &self.template {
            Some(template) => template.replace(COMPOSE_PLACEHOLDER, value),
            None => value.to_string(),
        }
    }
}

/// A parsed provider file.
#[derive(Debug, Clone)]
pub struct ProviderFile {
    path: PathBuf,
    doc: ProviderDocument,
}

impl ProviderFile {
    /// Read and parse the provider at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        Self::parse(path, &contents)
    }

    /// Parse provider `contents` as if read from `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let doc: ProviderDocument =
            toml::from_str(contents).map_err(|e| SysCfgError::invalid_file(path, e))?;
        Ok(ProviderFile {
            path: crate::util::fs::normalize_path(path),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.doc
            .variables
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn compose(&self) -> impl Iterator<Item = (&str, &ComposeEntry)> {
        self.doc.compose.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Declare this provider's System and variables into `session`.
    ///
    /// The session should be in provider mode when `[compose]` is used.
    pub fn evaluate(&self, session: &mut Session<'_>) -> Result<()> {
        session.set_origin(&self.path);
        let system = session.declare_system(&self.doc.system)?.clone();
        debug!("evaluating provider {} for {}", self.path.display(), system);

        for (key, value) in self.variables() {
            session.set(key, value)?;
        }

        for (key, entry) in self.compose_order() {
            let source = session.get(&entry.from)?;
            session.set(key, &entry.render(&source))?;
        }

        Ok(())
    }

    /// Compose entries ordered so that each runs after the entries it reads.
    ///
    /// Cycles and unknown sources are left in place; evaluating them reports
    /// the missing variable.
    fn compose_order(&self) -> Vec<(&str, &ComposeEntry)> {
        let mut pending: Vec<(&str, &ComposeEntry)> = self.compose().collect();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let waiting: BTreeSet<String> = pending
                .iter()
                .filter_map(|(key, _)| normalize(key).ok())
                .collect();
            let next = pending
                .iter()
                .position(|(_, entry)| {
                    normalize(&entry.from).map_or(true, |from| !waiting.contains(&from))
                })
                .unwrap_or(0);
            ordered.push(pending.remove(next));
        }

        ordered
    }
}
