//! Cache store subsystem.
//!
//! # Responsibilities
//! - Abstract key/value storage with per-entry expiry behind `CacheStore`
//! - Provide an in-process store and a redis store
//! - Build deterministic cache keys
//!
//! # Design Decisions
//! - Values are opaque strings (serialized JSON); stores never inspect them
//! - Presence means validity: expiry is the store's job, callers never
//!   check staleness
//! - Every store failure is `CacheError::Unavailable`; the orchestrator
//!   degrades to a miss or a skipped write

pub mod key;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

pub use key::CacheKey;
pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

/// Store-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store with expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` for `ttl_secs` seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Backend label for logs and metrics.
    fn provider_name(&self) -> &'static str;
}
