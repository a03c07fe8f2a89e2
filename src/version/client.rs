//! npm info client backed by the local cache

use tracing::{debug, info};

use crate::version::cache::Cache;
use crate::version::error::RegistryError;
use crate::version::registry::{NpmInfoClient, Registry};
use crate::version::types::NpmInfo;

/// Answers from the cache when the caller's content hash shows the package
/// is unchanged since it was last published, and from the registry otherwise.
pub struct CachedClient<R: Registry> {
    cache: Cache,
    registry: R,
}

impl<R: Registry> CachedClient<R> {
    pub fn new(cache: Cache, registry: R) -> Self {
        Self { cache, registry }
    }
}

#[async_trait::async_trait]
impl<R: Registry> NpmInfoClient for CachedClient<R> {
    async fn get_npm_info(
        &self,
        escaped_name: &str,
        known_content_hash: Option<&str>,
    ) -> Result<Option<NpmInfo>, RegistryError> {
        if let Some(hash) = known_content_hash
            && let Some(cached) = self.cache.get_npm_info(escaped_name)?
            && cached.latest_content_hash() == Some(hash)
        {
            debug!("Using cached npm info for {}", escaped_name);
            return Ok(Some(cached));
        }

        let fetched = self.registry.fetch_npm_info(escaped_name).await?;
        match &fetched {
            Some(npm_info) => self.cache.save_npm_info(escaped_name, npm_info)?,
            None => info!("{} is not published", escaped_name),
        }
        Ok(fetched)
    }
}
