//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Guarded upstream call:
//!     → circuit_breaker.rs (admit or fail fast, track failures)
//!     → timeouts.rs (race the call against its deadline)
//!     → outcome recorded back into the breaker exactly once
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline unless explicitly disabled
//! - No retries: a failed call is reported, not repeated
//! - Breaker state is local to the process

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{
    BreakerError, BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState,
};
pub use timeouts::{with_call_timeout, Elapsed};
