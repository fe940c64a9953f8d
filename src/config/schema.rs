//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resilience::CircuitBreakerConfig;

/// Root configuration for the weather gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// External weather provider.
    pub upstream: UpstreamConfig,

    /// Cache backend selection and tuning.
    pub cache: CacheConfig,

    /// Breaker and TTL settings for the forecast resource.
    pub weather: ResourceConfig,

    /// Breaker and TTL settings for the city search resource.
    pub city: ResourceConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            weather: ResourceConfig::weather(),
            city: ResourceConfig::city(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Upstream weather provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of a weatherapi.com-compatible API.
    pub base_url: String,

    /// API key sent as the `key` query parameter.
    pub api_key: String,

    /// Transport-level timeout in milliseconds. The breaker's call timeout
    /// is normally the tighter bound.
    pub request_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherapi.com/v1".to_string(),
            api_key: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Which cache store backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

/// Cache store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Redis connection URL (e.g., "redis://127.0.0.1:6379").
    pub redis_url: Option<String>,

    /// Upper bound for a single store operation in milliseconds.
    pub op_timeout_ms: u64,

    /// How often the in-memory store drops expired entries.
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: None,
            op_timeout_ms: 500,
            purge_interval_secs: 60,
        }
    }
}

/// Per-resource breaker thresholds and cache TTL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Consecutive failures before the breaker opens.
    pub max_failures: u32,

    /// Time the breaker stays open before a trial call.
    pub open_timeout_ms: u64,

    /// Deadline for one upstream call. 0 disables it.
    pub call_timeout_ms: u64,

    /// Cache TTL in seconds. 0 disables caching for the resource.
    pub cache_ttl_secs: u64,
}

impl ResourceConfig {
    /// Forecasts go stale quickly.
    pub fn weather() -> Self {
        Self {
            cache_ttl_secs: 900,
            ..Self::default()
        }
    }

    /// City lookups are cached for a week.
    pub fn city() -> Self {
        Self {
            cache_ttl_secs: 604_800,
            ..Self::default()
        }
    }

    pub fn breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::from_millis(
            self.max_failures,
            self.open_timeout_ms,
            self.call_timeout_ms,
        )
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            open_timeout_ms: 30_000,
            call_timeout_ms: 5_000,
            cache_ttl_secs: 900,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
