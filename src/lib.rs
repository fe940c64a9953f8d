//! Weather Gateway
//!
//! A caching, failure-isolating front for a rate-limited weather API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶  http (axum router, request ID, trace, timeout)
//!                          │
//!                          ▼
//!                     service (WeatherService / CityService)
//!                          │
//!                          ▼
//!                     CacheAside::fetch ──── get ────▶ cache (memory | redis)
//!                          │ miss
//!                          ▼
//!                     resilience (circuit breaker + call timeout)
//!                          │
//!                          ▼
//!                     upstream (reqwest provider) → mapping → cache set
//!
//!     Cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

// Core pipeline
pub mod cache;
pub mod mapping;
pub mod resilience;
pub mod service;
pub mod upstream;

// Adapters
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
