//! Registry documents as seen by the version logic

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// What npm knows about a published `@types` package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpmInfo {
    /// e.g. {"latest": "4.17.21", "next": "4.17.0-next.3"}
    pub dist_tags: HashMap<String, String>,
    /// Published versions in the order the registry lists them
    pub versions: IndexMap<String, NpmVersionInfo>,
    pub time_modified: Option<DateTime<Utc>>,
}

/// Per-version metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpmVersionInfo {
    /// Content hash recorded at publish time
    pub content_hash: Option<String>,
    pub deprecated: bool,
}

impl NpmInfo {
    pub fn dist_tag(&self, tag: &str) -> Option<&str> {
        self.dist_tags.get(tag).map(String::as_str)
    }

    /// Content hash of the version the `latest` dist-tag points to
    pub fn latest_content_hash(&self) -> Option<&str> {
        self.dist_tag("latest")
            .and_then(|v| self.versions.get(v))
            .and_then(|info| info.content_hash.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_content_hash_follows_latest_tag() {
        let info = NpmInfo {
            dist_tags: HashMap::from([("latest".to_string(), "1.0.1".to_string())]),
            versions: IndexMap::from([
                (
                    "1.0.0".to_string(),
                    NpmVersionInfo {
                        content_hash: Some("old".to_string()),
                        deprecated: false,
                    },
                ),
                (
                    "1.0.1".to_string(),
                    NpmVersionInfo {
                        content_hash: Some("new".to_string()),
                        deprecated: false,
                    },
                ),
            ]),
            time_modified: None,
        };

        assert_eq!(info.latest_content_hash(), Some("new"));
    }

    #[test]
    fn latest_content_hash_is_none_without_latest_tag() {
        assert_eq!(NpmInfo::default().latest_content_hash(), None);
    }
}
