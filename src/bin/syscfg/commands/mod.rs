//! Command implementations

pub mod completions;
pub mod configure;
pub mod get;
pub mod run;
pub mod status;
