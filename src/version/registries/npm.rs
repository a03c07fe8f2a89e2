//! npm registry API implementation

use std::collections::HashMap;

use crate::config::DEFAULT_REGISTRY_URL;
use crate::version::error::RegistryError;
use crate::version::registry::{NpmInfoClient, Registry};
use crate::version::types::{NpmInfo, NpmVersionInfo};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: IndexMap<String, NpmVersionResponse>,
    #[serde(default)]
    time: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NpmVersionResponse {
    #[serde(rename = "typesPublisherContentHash")]
    types_publisher_content_hash: Option<String>,
    /// Deprecation message; npm stores a string, older documents a boolean
    #[serde(default)]
    deprecated: serde_json::Value,
}

impl From<NpmPackageResponse> for NpmInfo {
    fn from(response: NpmPackageResponse) -> Self {
        let time_modified = response
            .time
            .get("modified")
            .and_then(|v| v.as_str())
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let versions = response
            .versions
            .into_iter()
            .map(|(version, meta)| {
                let info = NpmVersionInfo {
                    content_hash: meta.types_publisher_content_hash,
                    deprecated: is_truthy(&meta.deprecated),
                };
                (version, info)
            })
            .collect();

        NpmInfo {
            dist_tags: response.dist_tags,
            versions,
            time_modified,
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Registry implementation for npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("types-ledger")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_npm_info(&self, escaped_name: &str) -> Result<Option<NpmInfo>, RegistryError> {
        let url = format!("{}/{}", self.base_url, escaped_name);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(package_info.into()))
    }
}

/// Without a local copy every lookup goes to the network.
#[async_trait::async_trait]
impl NpmInfoClient for NpmRegistry {
    async fn get_npm_info(
        &self,
        escaped_name: &str,
        _known_content_hash: Option<&str>,
    ) -> Result<Option<NpmInfo>, RegistryError> {
        self.fetch_npm_info(escaped_name).await
    }
}
