//! Version calculation
//!
//! Compares the content hash of every parsed package with the one recorded
//! in npm at publish time, decides which packages need a new version, and
//! builds a fresh ledger plus the list of changed packages.
//!
//! [`determine_from_npm`] never touches disk. [`calculate_and_save`] writes
//! `versions.json` and `version-changes.json` only once the whole run
//! succeeded, staging both before either replaces the previous run's file.

use std::path::Path;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::config::{CHANGES_FILENAME, GRANDFATHERED_DEPRECATED_PACKAGES, VERSIONS_FILENAME};
use crate::data_file::stage_data_file;
use crate::packages::{AllPackages, AnyPackage};
use crate::version::changes::Change;
use crate::version::error::{ConsistencyViolation, VersionError};
use crate::version::ledger::Ledger;
use crate::version::registry::{NpmInfoClient, Registry};
use crate::version::semver::{MajorMinor, Semver, get_latest_version, latest_patch_matching};
use crate::version::types::NpmInfo;

/// Where the registry's version history stands for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteVersion {
    NeverPublished,
    Published(Semver),
}

impl RemoteVersion {
    /// The version to publish next for `target`
    pub fn update(
        &self,
        target: MajorMinor,
        is_prerelease: bool,
    ) -> Result<Semver, ConsistencyViolation> {
        match self {
            RemoteVersion::NeverPublished => {
                Ok(Semver::new(target.major, target.minor, 0, is_prerelease))
            }
            RemoteVersion::Published(version) => version.update(target, is_prerelease),
        }
    }
}

/// The registry's view of one package major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: RemoteVersion,
    /// Only computed for prerelease packages
    pub latest_non_prerelease: Option<Semver>,
    pub content_hash: String,
    pub deprecated: bool,
}

impl VersionInfo {
    fn never_published() -> Self {
        Self {
            version: RemoteVersion::NeverPublished,
            latest_non_prerelease: None,
            content_hash: String::new(),
            deprecated: false,
        }
    }
}

/// Result of a version calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatedVersions {
    pub ledger: Ledger,
    pub changes: Vec<Change>,
}

/// Calculates versions and changed packages by comparing the content hash of
/// parsed packages with the npm registry.
///
/// Up to `concurrency` fetches are in flight at once.
pub async fn determine_from_npm<C>(
    all_packages: &AllPackages,
    force_update: bool,
    client: &C,
    concurrency: usize,
) -> Result<CalculatedVersions, VersionError>
where
    C: NpmInfoClient + ?Sized,
{
    let concurrency = concurrency.max(1);
    let mut ledger = Ledger::new();
    let mut changes = Vec::new();

    let typings = all_packages.all_typings();
    let fetched: Vec<Option<VersionInfo>> = stream::iter(typings)
        .map(|pkg| {
            fetch_types_package_version_info(
                pkg,
                client,
                pkg.is_prerelease(),
                Some(pkg.major_minor()),
            )
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    for (pkg, version_info) in typings.iter().zip(fetched) {
        if version_info.is_none() {
            info!("Added: {}", pkg.desc());
        }
        let VersionInfo {
            version,
            latest_non_prerelease,
            content_hash,
            deprecated,
        } = version_info.unwrap_or_else(VersionInfo::never_published);

        if deprecated && !GRANDFATHERED_DEPRECATED_PACKAGES.contains(&pkg.name.as_str()) {
            return Err(ConsistencyViolation::UnexpectedDeprecation(pkg.name.clone()).into());
        }

        let version = match version {
            RemoteVersion::Published(v)
                if !force_update
                    && v.major_minor() == pkg.major_minor()
                    && content_hash == pkg.content_hash =>
            {
                v
            }
            remote => {
                info!("Changed: {}", pkg.desc());
                changes.push(Change::changed(pkg.id()));
                remote.update(pkg.major_minor(), pkg.is_prerelease())?
            }
        };

        ledger.record(&pkg.name, version, latest_non_prerelease)?;
    }

    let not_needed = all_packages.all_not_needed();
    let fetched: Vec<Option<VersionInfo>> = stream::iter(not_needed)
        // Not-needed packages are never prerelease.
        .map(|pkg| fetch_types_package_version_info(pkg, client, false, None))
        .buffered(concurrency)
        .try_collect()
        .await?;

    for (pkg, version_info) in not_needed.iter().zip(fetched) {
        let VersionInfo {
            version,
            deprecated,
            ..
        } = version_info.unwrap_or_else(VersionInfo::never_published);

        let version = match version {
            RemoteVersion::Published(v) if deprecated => v,
            remote => {
                info!("Now deprecated: {}", pkg.name);
                let major_version = match remote {
                    RemoteVersion::Published(v) => v.major,
                    RemoteVersion::NeverPublished => pkg.major(),
                };
                changes.push(Change::now_deprecated(&pkg.name, major_version));
                pkg.version()
            }
        };

        ledger.record(&pkg.name, version, None)?;
    }

    debug!(
        "Calculated {} versions, {} changed",
        ledger.len(),
        changes.len()
    );
    Ok(CalculatedVersions { ledger, changes })
}

/// Calculates versions and writes the ledger and change list to `data_dir`.
///
/// On any error, including a failed fetch, the files of the previous run are
/// left as they were.
pub async fn calculate_and_save<C>(
    all_packages: &AllPackages,
    force_update: bool,
    client: &C,
    concurrency: usize,
    data_dir: &Path,
) -> Result<CalculatedVersions, VersionError>
where
    C: NpmInfoClient + ?Sized,
{
    let calculated = determine_from_npm(all_packages, force_update, client, concurrency).await?;

    let versions_file = stage_data_file(data_dir, VERSIONS_FILENAME, &calculated.ledger)?;
    let changes_file = stage_data_file(data_dir, CHANGES_FILENAME, &calculated.changes)?;
    versions_file.commit()?;
    changes_file.commit()?;

    info!(
        "Recorded {} package versions, {} changed",
        calculated.ledger.len(),
        calculated.changes.len()
    );
    Ok(calculated)
}

/// Returns None if the package does not exist.
pub async fn fetch_types_package_version_info<P, C>(
    pkg: &P,
    client: &C,
    is_prerelease: bool,
    new_major_minor: Option<MajorMinor>,
) -> Result<Option<VersionInfo>, VersionError>
where
    P: AnyPackage + ?Sized,
    C: NpmInfoClient + ?Sized,
{
    let escaped_name = pkg.full_escaped_npm_name();
    let Some(info) = client
        .get_npm_info(&escaped_name, pkg.content_hash())
        .await?
    else {
        return Ok(None);
    };

    let latest_non_prerelease = if is_prerelease {
        get_latest_version(info.versions.keys())?
    } else {
        None
    };
    let version = get_version_semver(&escaped_name, &info, is_prerelease, new_major_minor)?;
    let version_text = version.to_string();
    let latest_version_info = info.versions.get(&version_text).ok_or_else(|| {
        ConsistencyViolation::MissingRemoteVersion {
            name: escaped_name.clone(),
            version: version_text.clone(),
        }
    })?;

    Ok(Some(VersionInfo {
        version: RemoteVersion::Published(version),
        latest_non_prerelease,
        content_hash: latest_version_info.content_hash.clone().unwrap_or_default(),
        deprecated: latest_version_info.deprecated,
    }))
}

/// The published version a package continues from.
///
/// If there's already a published version with the requested major and minor,
/// that line continues, even when it isn't the registry's latest. Otherwise
/// falls back to the `latest` dist-tag.
pub fn get_version_semver(
    escaped_name: &str,
    info: &NpmInfo,
    is_prerelease: bool,
    new_major_minor: Option<MajorMinor>,
) -> Result<Semver, VersionError> {
    if let Some(target) = new_major_minor
        && let Some(patch) = latest_patch_matching(info.versions.keys(), target, is_prerelease)
    {
        return Ok(Semver::new(target.major, target.minor, patch, is_prerelease));
    }

    // Usually latest should never be a prerelease, but it may be if only
    // prereleases were ever published.
    let latest = info
        .dist_tag("latest")
        .ok_or_else(|| ConsistencyViolation::MissingLatestTag(escaped_name.to_string()))?;
    Ok(Semver::parse_any(latest)?)
}

/// Registry state needed to publish the registry package itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedNpmInfo {
    pub version: Semver,
    pub highest_semver_version: Semver,
    pub content_hash: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Fetches a package bypassing any cache and checks that its `next`
/// dist-tag points at the highest published version.
pub async fn fetch_and_process_npm_info<R>(
    escaped_name: &str,
    registry: &R,
) -> Result<ProcessedNpmInfo, VersionError>
where
    R: Registry + ?Sized,
{
    let info = registry
        .fetch_npm_info(escaped_name)
        .await?
        .ok_or_else(|| ConsistencyViolation::NotPublished(escaped_name.to_string()))?;

    let version = get_version_semver(escaped_name, &info, false, None)?;
    let highest_semver_version = get_latest_version(info.versions.keys())?
        .ok_or_else(|| ConsistencyViolation::NotPublished(escaped_name.to_string()))?;

    let next = info.dist_tag("next");
    if next != Some(highest_semver_version.to_string().as_str()) {
        return Err(ConsistencyViolation::HighestVersionNotNext {
            name: escaped_name.to_string(),
            highest: highest_semver_version.to_string(),
            next: next.map(str::to_string),
        }
        .into());
    }

    let version_text = version.to_string();
    let content_hash = info
        .versions
        .get(&version_text)
        .ok_or_else(|| ConsistencyViolation::MissingRemoteVersion {
            name: escaped_name.to_string(),
            version: version_text.clone(),
        })?
        .content_hash
        .clone()
        .unwrap_or_default();

    Ok(ProcessedNpmInfo {
        version,
        highest_semver_version,
        content_hash,
        last_modified: info.time_modified,
    })
}
