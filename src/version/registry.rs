//! Registry traits for fetching package documents

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::NpmInfo;

/// Trait for fetching package documents from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches everything the registry knows about a package
    ///
    /// # Arguments
    /// * `escaped_name` - Scoped name escaped for a URL (e.g., "@types%2fnode")
    ///
    /// # Returns
    /// * `Ok(Some(NpmInfo))` - The package document
    /// * `Ok(None)` - The package was never published
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_npm_info(&self, escaped_name: &str) -> Result<Option<NpmInfo>, RegistryError>;
}

/// Source of package documents for version calculation
///
/// Implementations may answer from a local copy when `known_content_hash`
/// shows the package is unchanged.
#[async_trait::async_trait]
pub trait NpmInfoClient: Send + Sync {
    async fn get_npm_info(
        &self,
        escaped_name: &str,
        known_content_hash: Option<&str>,
    ) -> Result<Option<NpmInfo>, RegistryError>;
}
