//! Package descriptors read from the definitions file

use serde::{Deserialize, Serialize};

use crate::config::{PRERELEASE_TYPESCRIPT_VERSIONS, SCOPE_NAME};
use crate::version::semver::{MajorMinor, Semver};

/// Identity of one major version of a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageId {
    pub name: String,
    pub major_version: u32,
}

impl PackageId {
    pub fn new(name: impl Into<String>, major_version: u32) -> Self {
        Self {
            name: name.into(),
            major_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
}

/// Common view over typings packages and not-needed placeholders
pub trait AnyPackage {
    /// Unscoped name, e.g. `node` for `@types/node`
    fn name(&self) -> &str;

    fn major(&self) -> u32;

    fn minor(&self) -> u32;

    /// Whether this is a placeholder for a library that ships its own types
    fn is_not_needed(&self) -> bool;

    /// Hash of the package contents. Placeholders have none.
    fn content_hash(&self) -> Option<&str>;

    fn id(&self) -> PackageId {
        PackageId::new(self.name(), self.major())
    }

    /// Scoped npm name as it appears in a registry URL, e.g. `@types%2fnode`
    fn full_escaped_npm_name(&self) -> String {
        format!("@{}%2f{}", SCOPE_NAME, self.name())
    }

    /// Scoped npm name, e.g. `@types/node`
    fn full_npm_name(&self) -> String {
        format!("@{}/{}", SCOPE_NAME, self.name())
    }
}

/// One major version of a package maintained in DefinitelyTyped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingsData {
    pub name: String,
    pub major: u32,
    pub minor: u32,
    pub content_hash: String,
    /// Minimum TypeScript version required by the typings
    #[serde(rename = "typeScriptVersion")]
    pub typescript_version: String,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    /// Whether this is the highest major version of `name`. Computed when the
    /// catalog is read.
    #[serde(skip)]
    pub is_latest: bool,
}

impl TypingsData {
    pub fn major_minor(&self) -> MajorMinor {
        MajorMinor {
            major: self.major,
            minor: self.minor,
        }
    }

    /// Typings requiring an unreleased TypeScript are published as prereleases
    pub fn is_prerelease(&self) -> bool {
        PRERELEASE_TYPESCRIPT_VERSIONS.contains(&self.typescript_version.as_str())
    }

    /// Short description for log output
    pub fn desc(&self) -> String {
        if self.is_latest {
            self.name.clone()
        } else {
            format!("{} v{}.{}", self.name, self.major, self.minor)
        }
    }

    /// Path relative to the types directory, e.g. `node` or `node/v8`
    pub fn subdirectory_path(&self) -> String {
        if self.is_latest {
            self.name.clone()
        } else {
            format!("{}/v{}", self.name, self.major)
        }
    }

    pub fn github_usernames(&self) -> impl Iterator<Item = &str> {
        self.contributors
            .iter()
            .filter_map(|c| c.github_username.as_deref())
    }
}

impl AnyPackage for TypingsData {
    fn name(&self) -> &str {
        &self.name
    }

    fn major(&self) -> u32 {
        self.major
    }

    fn minor(&self) -> u32 {
        self.minor
    }

    fn is_not_needed(&self) -> bool {
        false
    }

    fn content_hash(&self) -> Option<&str> {
        Some(&self.content_hash)
    }
}

/// Placeholder for a library that now ships its own types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotNeededPackage {
    pub name: String,
    pub library_name: String,
    /// Version of `@types/<name>` that marks the package as deprecated
    pub as_of_version: Semver,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo_url: Option<String>,
}

impl NotNeededPackage {
    /// Never a prerelease
    pub fn version(&self) -> Semver {
        Semver {
            is_prerelease: false,
            ..self.as_of_version
        }
    }
}

impl AnyPackage for NotNeededPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn major(&self) -> u32 {
        self.as_of_version.major
    }

    fn minor(&self) -> u32 {
        self.as_of_version.minor
    }

    fn is_not_needed(&self) -> bool {
        true
    }

    fn content_hash(&self) -> Option<&str> {
        None
    }
}
