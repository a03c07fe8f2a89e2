//! Ledger of published versions
//!
//! Maps package name → major version → the patch last published for it.
//! Prerelease entries also point at the newest release so that dependents
//! can keep referring to a stable version.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::VERSIONS_FILENAME;
use crate::data_file::{read_data_file, read_file_and_warn, write_data_file, write_file};
use crate::packages::{PackageId, TypingsData};
use crate::version::error::{ConsistencyViolation, VersionError};
use crate::version::semver::Semver;

/// Name of the step that writes the ledger
pub const GENERATED_BY: &str = "calculate-versions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    pub patch: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_non_prerelease: Option<Semver>,
}

/// Versions of every package major, keyed by name then major version.
/// Both levels serialize in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    data: BTreeMap<String, BTreeMap<u32, VersionData>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the ledger from the data directory
    pub fn load(data_dir: &Path) -> Result<Self, VersionError> {
        Ok(read_data_file(data_dir, GENERATED_BY, VERSIONS_FILENAME)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, VersionError> {
        Ok(read_file_and_warn(GENERATED_BY, path)?)
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), VersionError> {
        Ok(write_data_file(data_dir, VERSIONS_FILENAME, self)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), VersionError> {
        Ok(write_file(path, self)?)
    }

    /// Record the version of a package major. Each major may be recorded once.
    pub fn record(
        &mut self,
        name: &str,
        version: Semver,
        latest_non_prerelease: Option<Semver>,
    ) -> Result<(), VersionError> {
        let majors = self.data.entry(name.to_string()).or_default();
        if majors.contains_key(&version.major) {
            return Err(ConsistencyViolation::DuplicateEntry {
                name: name.to_string(),
                major_version: version.major,
            }
            .into());
        }
        majors.insert(
            version.major,
            VersionData {
                patch: version.patch,
                latest_non_prerelease,
            },
        );
        Ok(())
    }

    pub fn info(&self, id: &PackageId) -> Result<&VersionData, VersionError> {
        self.data
            .get(&id.name)
            .and_then(|majors| majors.get(&id.major_version))
            .ok_or_else(|| VersionError::NotFound {
                name: id.name.clone(),
                major_version: id.major_version,
            })
    }

    /// Published version of a typings package
    pub fn get_version(&self, pkg: &TypingsData) -> Result<Semver, VersionError> {
        let info = self.info(&PackageId::new(&pkg.name, pkg.major))?;
        Ok(Semver::new(
            pkg.major,
            pkg.minor,
            info.patch,
            pkg.is_prerelease(),
        ))
    }

    /// Newest release of a package: the package itself when it is the latest
    /// major, otherwise the recorded pointer.
    pub fn latest_non_prerelease(&self, pkg: &TypingsData) -> Result<Semver, VersionError> {
        if pkg.is_latest {
            return self.get_version(pkg);
        }
        let id = PackageId::new(&pkg.name, pkg.major);
        self.info(&id)?
            .latest_non_prerelease
            .ok_or(VersionError::MissingPointer {
                name: id.name,
                major_version: id.major_version,
            })
    }

    pub fn len(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn typings(name: &str, major: u32, minor: u32, ts: &str, is_latest: bool) -> TypingsData {
        TypingsData {
            name: name.to_string(),
            major,
            minor,
            content_hash: "abc".to_string(),
            typescript_version: ts.to_string(),
            contributors: vec![],
            is_latest,
        }
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .record("react", Semver::new(16, 4, 7, false), None)
            .unwrap();
        ledger
            .record(
                "react",
                Semver::new(15, 6, 2, true),
                Some(Semver::new(16, 4, 7, false)),
            )
            .unwrap();
        ledger
            .record("jquery", Semver::new(3, 3, 0, false), None)
            .unwrap();
        ledger
    }

    #[test]
    fn save_then_load_reproduces_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = sample_ledger();

        ledger.save(temp_dir.path()).unwrap();
        let loaded = Ledger::load(temp_dir.path()).unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(
            loaded
                .info(&PackageId::new("react", 15))
                .unwrap()
                .latest_non_prerelease,
            Some(Semver::new(16, 4, 7, false))
        );
    }

    #[test]
    fn save_to_explicit_path_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("previous").join("versions.json");

        sample_ledger().save_to(&path).unwrap();

        assert_eq!(Ledger::load_from(&path).unwrap(), sample_ledger());
    }

    #[test]
    fn save_writes_sorted_keys_in_file_format() {
        let temp_dir = TempDir::new().unwrap();

        sample_ledger().save(temp_dir.path()).unwrap();
        let content = std::fs::read_to_string(temp_dir.path().join(VERSIONS_FILENAME)).unwrap();

        let expected = r#"{
  "jquery": {
    "3": {
      "patch": 0
    }
  },
  "react": {
    "15": {
      "patch": 2,
      "latestNonPrerelease": {
        "major": 16,
        "minor": 4,
        "patch": 7,
        "isPrerelease": false
      }
    },
    "16": {
      "patch": 7
    }
  }
}
"#;
        assert_eq!(content, expected);
    }

    #[test]
    fn majors_sort_numerically() {
        let mut ledger = Ledger::new();
        ledger.record("node", Semver::new(10, 0, 0, false), None).unwrap();
        ledger.record("node", Semver::new(9, 0, 0, false), None).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();

        assert_eq!(json, r#"{"node":{"9":{"patch":0},"10":{"patch":0}}}"#);
    }

    #[test]
    fn load_without_file_names_calculate_versions() {
        let temp_dir = TempDir::new().unwrap();

        let err = Ledger::load(temp_dir.path()).unwrap_err();

        assert!(err.to_string().contains("Run calculate-versions first!"));
    }

    #[test]
    fn record_rejects_duplicate_major() {
        let mut ledger = sample_ledger();

        let err = ledger
            .record("react", Semver::new(16, 5, 0, false), None)
            .unwrap_err();

        assert!(matches!(
            err,
            VersionError::Consistency(ConsistencyViolation::DuplicateEntry { ref name, major_version: 16 })
                if name == "react"
        ));
    }

    #[test]
    fn get_version_combines_package_and_recorded_patch() {
        let ledger = sample_ledger();

        assert_eq!(
            ledger
                .get_version(&typings("react", 16, 4, "2.8", true))
                .unwrap(),
            Semver::new(16, 4, 7, false)
        );
        assert_eq!(
            ledger
                .get_version(&typings("react", 15, 6, "next", false))
                .unwrap(),
            Semver::new(15, 6, 2, true)
        );
    }

    #[test]
    fn get_version_fails_for_unknown_major() {
        let ledger = sample_ledger();

        let err = ledger
            .get_version(&typings("react", 14, 0, "2.8", false))
            .unwrap_err();

        assert!(matches!(
            err,
            VersionError::NotFound { major_version: 14, .. }
        ));
        assert_eq!(err.to_string(), "No version info for react@14");
    }

    #[test]
    fn latest_non_prerelease_of_latest_package_is_its_own_version() {
        let ledger = sample_ledger();

        assert_eq!(
            ledger
                .latest_non_prerelease(&typings("react", 16, 4, "2.8", true))
                .unwrap(),
            Semver::new(16, 4, 7, false)
        );
    }

    #[test]
    fn latest_non_prerelease_follows_pointer() {
        let ledger = sample_ledger();

        assert_eq!(
            ledger
                .latest_non_prerelease(&typings("react", 15, 6, "next", false))
                .unwrap(),
            Semver::new(16, 4, 7, false)
        );
    }

    #[test]
    fn latest_non_prerelease_fails_without_pointer() {
        let mut ledger = Ledger::new();
        ledger
            .record("node", Semver::new(8, 10, 3, false), None)
            .unwrap();

        let err = ledger
            .latest_non_prerelease(&typings("node", 8, 10, "2.1", false))
            .unwrap_err();

        assert!(matches!(err, VersionError::MissingPointer { .. }));
    }
}
