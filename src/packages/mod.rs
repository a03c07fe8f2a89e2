//! Package catalog
//!
//! Typed view over the definitions file produced by `parse-definitions`.
//! The catalog is only read here; parsing the packages themselves happens
//! elsewhere.
//!
//! - [`types`]: package descriptors (`TypingsData`, `NotNeededPackage`)
//! - [`catalog`]: `AllPackages`, the set of every known package

pub mod catalog;
pub mod types;

pub use catalog::{AllPackages, PackageRef};
pub use types::{AnyPackage, Contributor, NotNeededPackage, PackageId, TypingsData};
