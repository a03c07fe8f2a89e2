//! Versions of packages published to npm
//!
//! A typings package is published either as `major.minor.patch`, or, when it
//! requires an unreleased TypeScript, as the prerelease `major.minor.0-next.patch`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::version::error::{ConsistencyViolation, SemverParseError};

// Per the semver spec <http://semver.org/#spec-item-2>:
// "A normal version number MUST take the form X.Y.Z where X, Y, and Z are
// non-negative integers, and MUST NOT contain leading zeroes."
static RELEASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("valid regex"));

static PRERELEASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.0-next\.(\d+)$").expect("valid regex"));

static ALPHA_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-alpha").expect("valid regex"));

static NEXT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-next\.\d+").expect("valid regex"));

/// Target major and minor of a typings package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MajorMinor {
    pub major: u32,
    pub minor: u32,
}

/// Version of a package published to npm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semver {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// If true, this is `major.minor.0-next.patch`.
    /// If false, this is `major.minor.patch`.
    pub is_prerelease: bool,
}

impl Semver {
    pub fn new(major: u32, minor: u32, patch: u32, is_prerelease: bool) -> Self {
        Self {
            major,
            minor,
            patch,
            is_prerelease,
        }
    }

    pub fn parse(text: &str, is_prerelease: bool) -> Result<Self, SemverParseError> {
        Self::try_parse(text, is_prerelease).ok_or_else(|| SemverParseError {
            text: text.to_string(),
            is_prerelease,
        })
    }

    /// Parses the output of `to_string`. Returns None on anything else.
    pub fn try_parse(text: &str, is_prerelease: bool) -> Option<Self> {
        let pattern = if is_prerelease {
            &PRERELEASE_PATTERN
        } else {
            &RELEASE_PATTERN
        };
        let captures = pattern.captures(text)?;
        let number = |i: usize| captures[i].parse::<u32>().ok();

        Some(Self::new(number(1)?, number(2)?, number(3)?, is_prerelease))
    }

    /// Parse a version that may not follow either format exactly.
    ///
    /// Once upon a time `-alpha` versions were published; those count as
    /// releases of the version before the suffix.
    pub fn parse_any(text: &str) -> Result<Self, SemverParseError> {
        if let Some(alpha) = ALPHA_SUFFIX.captures(text) {
            Self::parse(&alpha[1], false)
        } else if NEXT_SUFFIX.is_match(text) {
            Self::parse(text, true)
        } else {
            Self::parse(text, false)
        }
    }

    pub fn major_minor(&self) -> MajorMinor {
        MajorMinor {
            major: self.major,
            minor: self.minor,
        }
    }

    /// Compares major, minor and patch, ignoring the prerelease flag
    pub fn greater_than(&self, other: &Semver) -> bool {
        (self.major, self.minor, self.patch) > (other.major, other.minor, other.patch)
    }

    /// The version to publish next for `target`.
    ///
    /// Continues the patch sequence when major, minor and prerelease-ness are
    /// unchanged, otherwise starts over at patch 0.
    pub fn update(
        &self,
        target: MajorMinor,
        is_prerelease: bool,
    ) -> Result<Semver, ConsistencyViolation> {
        let patch = if self.major_minor() == target && self.is_prerelease == is_prerelease {
            self.patch
                .checked_add(1)
                .ok_or_else(|| ConsistencyViolation::PatchOverflow(self.to_string()))?
        } else {
            0
        };
        Ok(Semver::new(target.major, target.minor, patch, is_prerelease))
    }
}

impl fmt::Display for Semver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_prerelease {
            write!(f, "{}.{}.0-next.{}", self.major, self.minor, self.patch)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// Whether `a` should be reported as more current than `b`.
/// A release always beats a prerelease.
fn is_more_current(a: &Semver, b: &Semver) -> bool {
    match (a.is_prerelease, b.is_prerelease) {
        (true, false) => false,
        (false, true) => true,
        _ => a.greater_than(b),
    }
}

/// Find the most current of the given published versions.
///
/// Returns None for an empty list. The first of several equal versions wins.
pub fn get_latest_version<I, S>(versions: I) -> Result<Option<Semver>, SemverParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<Semver> = None;
    for text in versions {
        let version = Semver::parse_any(text.as_ref())?;
        if best.is_none_or(|current| is_more_current(&version, &current)) {
            best = Some(version);
        }
    }
    Ok(best)
}

/// Finds the highest patch among versions with the given major and minor.
///
/// Versions that don't parse in the requested format are skipped.
pub fn latest_patch_matching<I, S>(
    versions: I,
    target: MajorMinor,
    is_prerelease: bool,
) -> Option<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions
        .into_iter()
        .filter_map(|v| Semver::try_parse(v.as_ref(), is_prerelease))
        .filter(|v| v.major_minor() == target)
        .map(|v| v.patch)
        .max()
}
