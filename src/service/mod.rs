//! Resilient fetch services.
//!
//! # Responsibilities
//! - Cache-aside orchestration around a breaker-guarded upstream call
//! - One service per resource type, each owning its own breaker
//!
//! # Data Flow
//! ```text
//! http handler
//!     → WeatherService / CityService
//!     → CacheAside::fetch (orchestrator.rs)
//!     → CacheStore + CircuitBreaker + WeatherProvider + mapping
//! ```

pub mod city;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod weather;

pub use city::CityService;
pub use error::ServiceError;
pub use orchestrator::{validate_key, CacheAside};
pub use outcome::{FetchOutcome, Origin};
pub use weather::WeatherService;
