//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{CacheBackend, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file without validating it. Environment overrides are applied
/// by the caller before validation.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Apply the deployment environment variables on top of a loaded config.
///
/// `PORT` replaces the listener port, `API_URI`/`API_KEY` the upstream,
/// `REDIS_URI` (+ optional `REDIS_PORT`) switches the cache to redis.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{}", port.trim());
    }

    if let Some(uri) = var("API_URI") {
        config.upstream.base_url = uri;
    }

    if let Some(key) = var("API_KEY") {
        config.upstream.api_key = key;
    }

    if let Some(uri) = var("REDIS_URI") {
        let port = var("REDIS_PORT").unwrap_or_else(|| "6379".to_string());
        config.cache.backend = CacheBackend::Redis;
        config.cache.redis_url = Some(redis_url(&uri, port.trim()));
    }
}

/// `REDIS_URI` may be a bare host or a full URL. A bare host gets the scheme
/// and `REDIS_PORT` attached.
fn redis_url(uri: &str, port: &str) -> String {
    let uri = uri.trim();
    if uri.contains("://") {
        uri.to_string()
    } else {
        format!("redis://{uri}:{port}")
    }
}

/// Load, apply process environment overrides, validate.
pub fn load_from_env(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
