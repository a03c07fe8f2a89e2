use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DEFINITIONS_FILENAME;
use crate::data_file::{DataFileError, read_data_file};
use crate::packages::types::{AnyPackage, NotNeededPackage, PackageId, TypingsData};

/// Borrowed reference to either kind of package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageRef<'a> {
    Typings(&'a TypingsData),
    NotNeeded(&'a NotNeededPackage),
}

impl PackageRef<'_> {
    pub fn as_any(&self) -> &dyn AnyPackage {
        match self {
            PackageRef::Typings(pkg) => *pkg as &dyn AnyPackage,
            PackageRef::NotNeeded(pkg) => *pkg,
        }
    }
}

/// Every package known to DefinitelyTyped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllPackages {
    #[serde(default)]
    typings: Vec<TypingsData>,
    #[serde(default)]
    not_needed: Vec<NotNeededPackage>,
}

impl AllPackages {
    pub fn new(typings: Vec<TypingsData>, not_needed: Vec<NotNeededPackage>) -> Self {
        let mut all = Self {
            typings,
            not_needed,
        };
        all.mark_latest();
        all
    }

    /// Read the catalog written by `parse-definitions`
    pub fn read(data_dir: &Path) -> Result<Self, DataFileError> {
        let all: AllPackages = read_data_file(data_dir, "parse-definitions", DEFINITIONS_FILENAME)?;
        Ok(Self::new(all.typings, all.not_needed))
    }

    fn mark_latest(&mut self) {
        let mut latest: HashMap<String, u32> = HashMap::new();
        for pkg in &self.typings {
            let major = latest.entry(pkg.name.clone()).or_insert(pkg.major);
            *major = (*major).max(pkg.major);
        }
        for pkg in &mut self.typings {
            pkg.is_latest = latest.get(&pkg.name) == Some(&pkg.major);
        }
    }

    pub fn all_typings(&self) -> &[TypingsData] {
        &self.typings
    }

    pub fn all_not_needed(&self) -> &[NotNeededPackage] {
        &self.not_needed
    }

    /// Finds a typings package by id, falling back to not-needed packages by name
    pub fn get_any_package(&self, id: &PackageId) -> Option<PackageRef<'_>> {
        self.typings
            .iter()
            .find(|pkg| pkg.name == id.name && pkg.major == id.major_version)
            .map(PackageRef::Typings)
            .or_else(|| {
                self.not_needed
                    .iter()
                    .find(|pkg| pkg.name == id.name)
                    .map(PackageRef::NotNeeded)
            })
    }
}
