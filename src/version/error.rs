use thiserror::Error;

use crate::data_file::DataFileError;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unexpected semver: {text} (isPrerelease: {is_prerelease})")]
pub struct SemverParseError {
    pub text: String,
    pub is_prerelease: bool,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Data that contradicts what a run expects. Always aborts the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyViolation {
    #[error("Package {0} has been deprecated, so we shouldn't have parsed it. Was it re-added?")]
    UnexpectedDeprecation(String),

    #[error("Version of {name}@{major_version} was recorded twice")]
    DuplicateEntry { name: String, major_version: u32 },

    #[error("npm info for {name} has no version {version}")]
    MissingRemoteVersion { name: String, version: String },

    #[error("No patch version left after {0}")]
    PatchOverflow(String),

    #[error("{0} is not published to npm")]
    NotPublished(String),

    #[error("npm info for {0} has no \"latest\" dist-tag")]
    MissingLatestTag(String),

    #[error("Highest version of {name} is {highest}, but the \"next\" dist-tag is {next:?}")]
    HighestVersionNotNext {
        name: String,
        highest: String,
        next: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("No version info for {name}@{major_version}")]
    NotFound { name: String, major_version: u32 },

    #[error("No latest non-prerelease version recorded for {name}@{major_version}")]
    MissingPointer { name: String, major_version: u32 },

    #[error(transparent)]
    Parse(#[from] SemverParseError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyViolation),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    DataFile(#[from] DataFileError),
}
