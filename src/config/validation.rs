//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds >= 1, timeouts > 0, addresses parse)
//! - Keep cache I/O inside each resource's call timeout
//! - Check that the selected cache backend is fully configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{CacheBackend, GatewayConfig, ResourceConfig};

/// One semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("invalid URL: {e}"),
        )),
    }

    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "upstream.request_timeout_ms",
            "must be greater than 0",
        ));
    }

    validate_resource("weather", &config.weather, &mut errors);
    validate_resource("city", &config.city, &mut errors);

    if config.cache.backend == CacheBackend::Redis {
        match config.cache.redis_url.as_deref() {
            None | Some("") => errors.push(ValidationError::new(
                "cache.redis_url",
                "required when cache.backend = \"redis\"",
            )),
            Some(raw) => {
                if let Err(e) = redis::Client::open(raw) {
                    errors.push(ValidationError::new(
                        "cache.redis_url",
                        format!("invalid redis URL: {e}"),
                    ));
                }
            }
        }
    }

    if config.cache.op_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "cache.op_timeout_ms",
            "must be greater than 0",
        ));
    }

    for (name, resource) in [("weather", &config.weather), ("city", &config.city)] {
        if resource.call_timeout_ms > 0 && config.cache.op_timeout_ms >= resource.call_timeout_ms {
            errors.push(ValidationError::new(
                format!("{name}.call_timeout_ms"),
                format!(
                    "must exceed cache.op_timeout_ms ({}) so cache I/O fits in the call budget",
                    config.cache.op_timeout_ms
                ),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than 0",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_resource(name: &str, resource: &ResourceConfig, errors: &mut Vec<ValidationError>) {
    if resource.max_failures == 0 {
        errors.push(ValidationError::new(
            format!("{name}.max_failures"),
            "must be at least 1",
        ));
    }
}
