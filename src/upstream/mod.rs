//! Upstream weather provider.
//!
//! # Responsibilities
//! - Define the remote fetch capability (`WeatherProvider`)
//! - Talk to a weatherapi.com-compatible HTTP API
//!
//! # Design Decisions
//! - The trait is the seam: services depend on `Arc<dyn WeatherProvider>`,
//!   tests substitute scripted providers
//! - No retries here; failure accounting belongs to the breaker

pub mod client;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use client::WeatherApiClient;
pub use types::{RawForecastResponse, RawSearchResult};

/// Provider call failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Connection, TLS, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// Body was not the expected JSON.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// One day of hourly forecast for `city`.
    async fn forecast(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<RawForecastResponse, UpstreamError>;

    /// Candidate cities for a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>, UpstreamError>;
}
