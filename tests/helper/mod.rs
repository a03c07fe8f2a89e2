//! Shared test utilities

#![allow(dead_code)]

mod registry;

pub use registry::MockRegistry;

use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use types_ledger::config::DEFINITIONS_FILENAME;
use types_ledger::version::cache::Cache;

/// A typings entry of the definitions file
pub fn typings(name: &str, major: u32, minor: u32, content_hash: &str) -> Value {
    json!({
        "name": name,
        "major": major,
        "minor": minor,
        "contentHash": content_hash,
        "typeScriptVersion": "2.3",
        "contributors": [
            { "name": "Owner", "url": "https://github.com/owner", "githubUsername": "owner" }
        ]
    })
}

/// A not-needed entry of the definitions file
pub fn not_needed(name: &str, major: u32, minor: u32, patch: u32) -> Value {
    json!({
        "name": name,
        "libraryName": name,
        "asOfVersion": { "major": major, "minor": minor, "patch": patch, "isPrerelease": false }
    })
}

/// Write the definitions file read by `AllPackages::read`
pub fn write_definitions(data_dir: &Path, typings: Vec<Value>, not_needed: Vec<Value>) {
    std::fs::create_dir_all(data_dir).unwrap();
    let definitions = json!({ "typings": typings, "notNeeded": not_needed });
    std::fs::write(
        data_dir.join(DEFINITIONS_FILENAME),
        serde_json::to_string_pretty(&definitions).unwrap(),
    )
    .unwrap();
}

/// Create an empty npm info cache in a temporary directory
pub fn create_test_cache() -> (TempDir, Cache) {
    let temp_dir = TempDir::new().unwrap();
    let cache = Cache::new(&temp_dir.path().join("npm-info.db")).unwrap();
    (temp_dir, cache)
}
