//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (cache janitor, metrics, signal handler)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - An unreachable redis is not a startup error; the store connects lazily
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::{CacheError, CacheStore, MemoryCacheStore, RedisCacheStore};
use crate::config::{CacheBackend, CacheConfig, GatewayConfig};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::metrics;
use crate::service::{CityService, WeatherService};
use crate::upstream::{UpstreamError, WeatherApiClient, WeatherProvider};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cache store: {0}")]
    Cache(#[from] CacheError),

    #[error("upstream client: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("metrics exporter: {0}")]
    Metrics(String),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the configured cache store. The memory store gets a janitor task
/// tied to `shutdown`.
pub fn build_cache_store(
    config: &CacheConfig,
    shutdown: &Shutdown,
) -> Result<Arc<dyn CacheStore>, StartupError> {
    match config.backend {
        CacheBackend::Memory => {
            let store = MemoryCacheStore::new();
            if config.purge_interval_secs > 0 {
                store.spawn_janitor(
                    Duration::from_secs(config.purge_interval_secs),
                    shutdown.subscribe(),
                );
            }
            tracing::info!("Using in-memory cache store");
            Ok(Arc::new(store))
        }
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            let store = RedisCacheStore::new(url, Duration::from_millis(config.op_timeout_ms))?;
            tracing::info!(store = ?store, "Using redis cache store");
            Ok(Arc::new(store))
        }
    }
}

/// Wire the services from configuration and the given collaborators.
pub fn build_state(
    config: &GatewayConfig,
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn CacheStore>,
) -> AppState {
    let cache_backend = store.provider_name();
    let cache_timeout = Duration::from_millis(config.cache.op_timeout_ms);
    AppState {
        weather: Arc::new(
            WeatherService::new(Arc::clone(&provider), Arc::clone(&store), &config.weather)
                .with_cache_timeout(cache_timeout),
        ),
        cities: Arc::new(
            CityService::new(provider, store, &config.city).with_cache_timeout(cache_timeout),
        ),
        cache_backend,
    }
}

/// Start everything and serve until a stop signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| StartupError::Metrics(format!("invalid metrics address: {e}")))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let shutdown = Shutdown::new();
    let store = build_cache_store(&config.cache, &shutdown)?;

    if config.upstream.api_key.is_empty() {
        tracing::warn!("No upstream API key configured; provider calls will likely be rejected");
    }
    let provider: Arc<dyn WeatherProvider> = Arc::new(WeatherApiClient::new(&config.upstream)?);

    let state = build_state(&config, provider, store);
    let server = HttpServer::new(state, Duration::from_secs(config.timeouts.request_secs));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    spawn_signal_handler(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    Ok(())
}
