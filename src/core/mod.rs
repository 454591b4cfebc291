//! Core data structures for syscfg.
//!
//! This module contains the foundational types of the registry protocol:
//! - Identifiers (System names, variable keys, identities)
//! - The host environment and its capabilities
//! - The variable store and sessions with their protocol guard
//! - Provider files and project manifests

pub mod error;
pub mod host;
pub mod identifier;
pub mod project;
pub mod provider;
pub mod session;
pub mod store;

pub use error::{Result, SysCfgError};
pub use host::{Environment, Host, HostMode, InstallSettings, MapEnv, ProcessEnv};
pub use identifier::{Identity, SystemName, VariableKey};
pub use project::{ProjectManifest, MANIFEST_FILE_NAME};
pub use provider::ProviderFile;
pub use session::{Access, ExecutionMode, GuardState, ProtocolGuard, Scope, Session};
pub use store::{DeclareOutcome, VariableStore, CACHE_FILE_NAME};
