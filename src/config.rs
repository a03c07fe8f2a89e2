use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Data file names
// =============================================================================

/// Ledger of published versions, written by `calculate-versions`
pub const VERSIONS_FILENAME: &str = "versions.json";

/// Packages changed by the last `calculate-versions` run
pub const CHANGES_FILENAME: &str = "version-changes.json";

/// Package catalog, written by `parse-definitions`
pub const DEFINITIONS_FILENAME: &str = "definitions.json";

/// Name of the npm scope every typings package is published under
pub const SCOPE_NAME: &str = "types";

/// Directory inside DefinitelyTyped holding one subdirectory per package
pub const TYPES_DIRECTORY_NAME: &str = "types";

// =============================================================================
// Policy
// =============================================================================

/// Packages whose latest published version is deprecated on npm but which are
/// still maintained in DefinitelyTyped.
/// See https://github.com/DefinitelyTyped/DefinitelyTyped/pull/22306
pub const GRANDFATHERED_DEPRECATED_PACKAGES: &[&str] = &["angular-ui-router", "ui-router-extras"];

/// TypeScript versions that are not released yet. Packages requiring one of
/// these are published as `major.minor.0-next.patch`.
pub const PRERELEASE_TYPESCRIPT_VERSIONS: &[&str] = &["next"];

/// Default number of registry fetches in flight at once
pub const DEFAULT_FETCH_CONCURRENCY: usize = 16;

/// Default base URL for npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TYPES_LEDGER_DATA_DIR";

/// Settings for a run
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Location of the DefinitelyTyped checkout, e.g. `../DefinitelyTyped`
    pub definitely_typed_path: PathBuf,
    /// Directory holding the generated data files
    pub data_dir: PathBuf,
    pub registry: RegistryConfig,
    pub cache: CacheConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            definitely_typed_path: PathBuf::from("../DefinitelyTyped"),
            data_dir: data_dir(),
            registry: RegistryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Options {
    /// Reads options from a JSON file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Location of all types packages. This is a subdirectory of DefinitelyTyped.
    pub fn types_path(&self) -> PathBuf {
        self.definitely_typed_path.join(TYPES_DIRECTORY_NAME)
    }
}

/// Registry-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    /// Maximum number of fetches in flight
    pub concurrency: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// npm info cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Returns the data directory.
/// Uses $TYPES_LEDGER_DATA_DIR if set, otherwise ./data
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var(DATA_DIR_ENV).ok())
}

/// Returns the path to the npm info cache database.
/// Uses $XDG_CACHE_HOME/types-ledger if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/types-ledger,
/// or ./types-ledger if neither is available.
pub fn cache_db_path() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir()).join("npm-info.db")
}

/// Returns the path to the log file.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("types-ledger.log")
}

fn data_dir_with_env(data_dir: Option<String>) -> PathBuf {
    data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("types-ledger")
}
