//! Registry test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use indexmap::IndexMap;

use types_ledger::version::error::RegistryError;
use types_ledger::version::registry::Registry;
use types_ledger::version::types::{NpmInfo, NpmVersionInfo};

/// Mock registry for testing
#[derive(Default)]
pub struct MockRegistry {
    infos: HashMap<String, NpmInfo>,
    failing: Vec<String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `versions` (version, content hash, deprecated) for `@types/<name>`.
    /// The last version becomes `latest`.
    pub fn with_versions(mut self, name: &str, versions: Vec<(&str, &str, bool)>) -> Self {
        let latest = versions
            .last()
            .map(|(v, _, _)| v.to_string())
            .unwrap_or_default();
        let versions: IndexMap<String, NpmVersionInfo> = versions
            .into_iter()
            .map(|(v, hash, deprecated)| {
                (
                    v.to_string(),
                    NpmVersionInfo {
                        content_hash: Some(hash.to_string()),
                        deprecated,
                    },
                )
            })
            .collect();

        self.infos.insert(
            format!("@types%2f{}", name),
            NpmInfo {
                dist_tags: HashMap::from([("latest".to_string(), latest)]),
                versions,
                time_modified: None,
            },
        );
        self
    }

    /// Answer fetches of `@types/<name>` with an error
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.push(format!("@types%2f{}", name));
        self
    }

    /// Log of fetched names, in request order. Stays readable after the
    /// registry is moved into a client.
    pub fn fetch_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.fetched)
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_npm_info(&self, escaped_name: &str) -> Result<Option<NpmInfo>, RegistryError> {
        self.fetched.lock().unwrap().push(escaped_name.to_string());
        if self.failing.iter().any(|name| name == escaped_name) {
            return Err(RegistryError::InvalidResponse(format!(
                "HTTP 500 for {}",
                escaped_name
            )));
        }
        Ok(self.infos.get(escaped_name).cloned())
    }
}
