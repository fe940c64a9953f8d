//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT / API_URI / API_KEY / REDIS_URI / REDIS_PORT overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once at startup to build the services
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, load_from_env, ConfigError};
pub use schema::{
    CacheBackend, CacheConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ResourceConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
