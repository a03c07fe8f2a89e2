//! Packages changed by the last version calculation
//!
//! Each run replaces the previous list entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CHANGES_FILENAME;
use crate::data_file::{read_data_file, write_data_file};
use crate::packages::{AllPackages, PackageId, PackageRef};
use crate::version::error::VersionError;
use crate::version::ledger::{GENERATED_BY, Ledger};

/// A package major that needs publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub name: String,
    pub major_version: u32,
    /// Set when a not-needed package must be published as deprecated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Change {
    /// Typings whose contents changed
    pub fn changed(id: PackageId) -> Self {
        Self {
            name: id.name,
            major_version: id.major_version,
            deprecated: false,
        }
    }

    /// A not-needed package that isn't deprecated on npm yet
    pub fn now_deprecated(name: impl Into<String>, major_version: u32) -> Self {
        Self {
            name: name.into(),
            major_version,
            deprecated: true,
        }
    }

    pub fn id(&self) -> PackageId {
        PackageId::new(&self.name, self.major_version)
    }
}

pub fn write_changes(data_dir: &Path, changes: &[Change]) -> Result<(), VersionError> {
    Ok(write_data_file(data_dir, CHANGES_FILENAME, changes)?)
}

/// Read all changed packages
pub fn read_changes(data_dir: &Path) -> Result<Vec<Change>, VersionError> {
    Ok(read_data_file(data_dir, GENERATED_BY, CHANGES_FILENAME)?)
}

pub fn read_versions_and_changes(data_dir: &Path) -> Result<(Ledger, Vec<Change>), VersionError> {
    Ok((Ledger::load(data_dir)?, read_changes(data_dir)?))
}

/// Resolve change records back to catalog packages
pub fn changed_packages<'a>(
    all_packages: &'a AllPackages,
    changes: &[Change],
) -> Result<Vec<PackageRef<'a>>, VersionError> {
    changes
        .iter()
        .map(|change| {
            all_packages
                .get_any_package(&change.id())
                .ok_or_else(|| VersionError::NotFound {
                    name: change.name.clone(),
                    major_version: change.major_version,
                })
        })
        .collect()
}
