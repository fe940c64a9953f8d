use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::ResourceConfig;
use crate::mapping::{map_search, CityResult};
use crate::resilience::CircuitBreaker;
use crate::service::error::ServiceError;
use crate::service::orchestrator::CacheAside;
use crate::service::outcome::FetchOutcome;
use crate::upstream::{UpstreamError, WeatherProvider};

/// City search candidates for autocomplete.
pub struct CityService {
    cache: CacheAside,
    provider: Arc<dyn WeatherProvider>,
}

impl CityService {
    pub const RESOURCE: &'static str = "city";

    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn CacheStore>,
        config: &ResourceConfig,
    ) -> Self {
        let breaker = CircuitBreaker::new(Self::RESOURCE, config.breaker());
        Self {
            cache: CacheAside::new(Self::RESOURCE, "query", config.cache_ttl_secs, breaker, store),
            provider,
        }
    }

    pub async fn fetch(&self, query: &str) -> Result<FetchOutcome<Vec<CityResult>>, ServiceError> {
        let provider = Arc::clone(&self.provider);
        self.cache
            .fetch(query, None, move |query| async move {
                let raw = provider.search(&query).await?;
                Ok::<_, UpstreamError>(map_search(&raw))
            })
            .await
    }

    pub fn with_cache_timeout(mut self, limit: Duration) -> Self {
        self.cache = self.cache.with_cache_timeout(limit);
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.cache.ttl_secs()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        self.cache.breaker()
    }
}
