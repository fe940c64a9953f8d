use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use crate::cache::CacheStore;
use crate::config::ResourceConfig;
use crate::mapping::{map_forecast, DailyForecast};
use crate::resilience::CircuitBreaker;
use crate::service::error::ServiceError;
use crate::service::orchestrator::CacheAside;
use crate::service::outcome::FetchOutcome;
use crate::upstream::{UpstreamError, WeatherProvider};

/// Per-city daily forecasts, bucketed by date in the cache.
pub struct WeatherService {
    cache: CacheAside,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub const RESOURCE: &'static str = "weather";

    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn CacheStore>,
        config: &ResourceConfig,
    ) -> Self {
        let breaker = CircuitBreaker::new(Self::RESOURCE, config.breaker());
        Self {
            cache: CacheAside::new(Self::RESOURCE, "city", config.cache_ttl_secs, breaker, store),
            provider,
        }
    }

    /// Today's forecast (UTC calendar day).
    pub async fn fetch(&self, city: &str) -> Result<FetchOutcome<DailyForecast>, ServiceError> {
        self.fetch_for_date(city, Utc::now().date_naive()).await
    }

    pub async fn fetch_for_date(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<FetchOutcome<DailyForecast>, ServiceError> {
        let provider = Arc::clone(&self.provider);
        self.cache
            .fetch(city, Some(date), move |city| async move {
                let raw = provider.forecast(&city, date).await?;
                Ok::<_, UpstreamError>(map_forecast(&raw, date, Utc::now()))
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
