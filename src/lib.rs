//! Maintenance tooling for `@types` packages
//!
//! - [`version`]: version calculation against the npm registry
//! - [`packages`]: catalog of typings and not-needed packages
//! - [`code_owners`]: CODEOWNERS generation
//! - [`config`]: options and constants
//! - [`data_file`]: JSON files shared between steps
//! - [`logging`]: tracing setup

pub mod code_owners;
pub mod config;
pub mod data_file;
pub mod logging;
pub mod packages;
pub mod version;
