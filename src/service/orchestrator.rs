//! Cache-aside orchestration.
//!
//! # Data Flow
//! ```text
//! fetch(raw key)
//!     → validate (no I/O on bad input)
//!     → cache get (error = miss)
//!     → hit: FetchOutcome{Cache}
//!     → miss: breaker.execute(remote → map → cache set)
//!         → ok: FetchOutcome{Live}
//!         → err: UpstreamUnavailable (cause logged + counted)
//! ```
//!
//! # Design Decisions
//! - Cache failures never fail a request
//! - Reads are bounded by the cache timeout (or the call timeout when none is
//!   set); a slow read is a miss
//! - The write happens inside the guarded call but its deadline ends no later
//!   than the call's, so a slow store never turns a fetched payload into a
//!   breaker failure
//! - No deduplication of concurrent misses; last writer wins

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;

use crate::cache::{CacheError, CacheKey, CacheResult, CacheStore};
use crate::observability::metrics;
use crate::resilience::CircuitBreaker;
use crate::service::error::ServiceError;
use crate::service::outcome::FetchOutcome;
use crate::upstream::UpstreamError;

pub const MAX_KEY_CHARS: usize = 128;

/// Trim and check a client-supplied key. `field` names it in the message.
pub fn validate_key(field: &str, raw: &str) -> Result<String, ServiceError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    if key.chars().count() > MAX_KEY_CHARS {
        return Err(ServiceError::Validation(format!(
            "{field} must be at most {MAX_KEY_CHARS} characters"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(ServiceError::Validation(format!(
            "{field} contains control characters"
        )));
    }
    Ok(key.to_string())
}

/// Cache-aside pipeline for one resource type.
pub struct CacheAside {
    resource: &'static str,
    field: &'static str,
    ttl_secs: u64,
    breaker: CircuitBreaker,
    store: Arc<dyn CacheStore>,
    cache_timeout: Option<Duration>,
}

impl CacheAside {
    pub fn new(
        resource: &'static str,
        field: &'static str,
        ttl_secs: u64,
        breaker: CircuitBreaker,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            resource,
            field,
            ttl_secs,
            breaker,
            store,
            cache_timeout: None,
        }
    }

    /// Bound each store operation, on top of whatever the store enforces.
    pub fn with_cache_timeout(mut self, limit: Duration) -> Self {
        self.cache_timeout = (!limit.is_zero()).then_some(limit);
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Serve `raw_key` from cache, or from `remote` under the breaker.
    ///
    /// `remote` receives the trimmed key with its original casing.
    pub async fn fetch<T, F, Fut>(
        &self,
        raw_key: &str,
        bucket: Option<NaiveDate>,
        remote: F,
    ) -> Result<FetchOutcome<T>, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let key = validate_key(self.field, raw_key)?;
        let cache_key = match bucket {
            Some(date) => CacheKey::dated(self.resource, &key, date),
            None => CacheKey::new(self.resource, &key),
        };

        if let Some(payload) = self.lookup::<T>(&cache_key).await {
            return Ok(FetchOutcome::cached(payload));
        }

        // Taken before the breaker arms its own timer, so it never fires later.
        let call_deadline = self
            .breaker
            .config()
            .call_timeout
            .map(|limit| Instant::now() + limit);

        let cache_key = &cache_key;
        let result = self
            .breaker
            .execute(|| async move {
                let payload = remote(key).await?;
                self.populate(cache_key, &payload, call_deadline).await;
                Ok::<T, UpstreamError>(payload)
            })
            .await;

        match result {
            Ok(payload) => Ok(FetchOutcome::live(payload)),
            Err(err) => {
                tracing::warn!(
                    resource = self.resource,
                    cache_key = %cache_key,
                    cause = err.cause(),
                    error = %err,
                    "Upstream fetch failed"
                );
                metrics::record_upstream_failure(self.resource, err.cause());
                Err(ServiceError::UpstreamUnavailable {
                    resource: self.resource,
                })
            }
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, cache_key: &CacheKey) -> Option<T> {
        if self.ttl_secs == 0 {
            return None;
        }

        let read_limit = self.cache_timeout.or(self.breaker.config().call_timeout);
        let read_deadline = read_limit.map(|limit| Instant::now() + limit);
        let raw = match self
            .bounded(read_deadline, self.store.get(cache_key.as_str()))
            .await
        {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(resource = self.resource, cache_key = %cache_key, "Cache miss");
                metrics::record_cache_lookup(self.resource, false);
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    resource = self.resource,
                    cache_key = %cache_key,
                    store = self.store.provider_name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                metrics::record_cache_error(self.resource, "get");
                metrics::record_cache_lookup(self.resource, false);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(payload) => {
                tracing::debug!(resource = self.resource, cache_key = %cache_key, "Cache hit");
                metrics::record_cache_lookup(self.resource, true);
                Some(payload)
            }
            Err(e) => {
                tracing::warn!(
                    resource = self.resource,
                    cache_key = %cache_key,
                    error = %e,
                    "Undecodable cache record, treating as miss"
                );
                metrics::record_cache_error(self.resource, "decode");
                metrics::record_cache_lookup(self.resource, false);
                None
            }
        }
    }

    async fn populate<T: Serialize>(
        &self,
        cache_key: &CacheKey,
        payload: &T,
        call_deadline: Option<Instant>,
    ) {
        if self.ttl_secs == 0 {
            return;
        }

        let raw = match serde_json::to_string(payload) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(resource = self.resource, error = %e, "Failed to encode payload for cache");
                metrics::record_cache_error(self.resource, "encode");
                return;
            }
        };

        let own_deadline = self.cache_timeout.map(|limit| Instant::now() + limit);
        let deadline = match (own_deadline, call_deadline) {
            (Some(own), Some(call)) => Some(own.min(call)),
            (own, call) => own.or(call),
        };

        let write = self.store.set(cache_key.as_str(), &raw, self.ttl_secs);
        if let Err(e) = self.bounded(deadline, write).await {
            tracing::warn!(
                resource = self.resource,
                cache_key = %cache_key,
                store = self.store.provider_name(),
                error = %e,
                "Cache write failed, serving live payload anyway"
            );
            metrics::record_cache_error(self.resource, "set");
        }
    }

    async fn bounded<V>(
        &self,
        deadline: Option<Instant>,
        op: impl Future<Output = CacheResult<V>>,
    ) -> CacheResult<V> {
        match deadline {
            None => op.await,
            Some(deadline) => tokio::time::timeout_at(deadline, op)
                .await
                .unwrap_or_else(|_| {
                    Err(CacheError::Unavailable(format!(
                        "{} store did not answer in time",
                        self.store.provider_name()
                    )))
                }),
        }
    }
}
