//! syscfg - a shared configuration registry for families of build projects
//!
//! A provider declares the variables of a System once; any number of
//! independent consuming projects read them later through the user's package
//! registry, with environment variables able to override any value.

pub mod core;
pub mod ops;
pub mod registry;
pub mod util;

/// Test utilities and mocks for syscfg unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process executor and provider
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    error::{Result, SysCfgError},
    host::{Host, HostMode},
    identifier::{SystemName, VariableKey},
    session::{ExecutionMode, Session},
    store::VariableStore,
};

pub use util::context::GlobalContext;
