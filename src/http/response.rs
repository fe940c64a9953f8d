//! Response shaping.
//!
//! # Responsibilities
//! - Wire shapes for the weather, cities and status endpoints
//! - Map service errors to HTTP status codes
//!
//! # Design Decisions
//! - Validation → 400, upstream unavailable → 503
//! - Error bodies are always `{"error": ..., "detail": ...}`
//! - `next_refresh_in_seconds` is derived from when the record was fetched,
//!   so cached responses count down toward expiry

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mapping::{CityResult, DailyForecast, HourlyWeather};
use crate::resilience::BreakerSnapshot;
use crate::service::{FetchOutcome, Origin, ServiceError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: Option<String>,
}

/// Error returned by handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                detail: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => Self::bad_request(message),
            ServiceError::UpstreamUnavailable { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorBody {
                    error: err.to_string(),
                    detail: Some("try again later".to_string()),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResponse {
    pub city: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub date: String,
    pub last_updated: String,
    pub sunrise: String,
    pub sunset: String,
    pub next_refresh_in_seconds: u64,
    pub weather: Vec<HourlyWeather>,
    pub source: Origin,
    pub error: Option<String>,
}

impl WeatherResponse {
    pub fn from_outcome(outcome: FetchOutcome<DailyForecast>, ttl_secs: u64, now: DateTime<Utc>) -> Self {
        let forecast = outcome.payload;
        let next_refresh_in_seconds = seconds_until_refresh(&forecast.cached_at, ttl_secs, now);

        Self {
            city: forecast.city,
            region: forecast.region,
            country: forecast.country,
            lat: forecast.lat,
            lon: forecast.lon,
            date: forecast.date,
            last_updated: forecast.last_updated,
            sunrise: forecast.sunrise,
            sunset: forecast.sunset,
            next_refresh_in_seconds,
            weather: forecast.weather,
            source: outcome.origin,
            error: None,
        }
    }
}

fn seconds_until_refresh(cached_at: &str, ttl_secs: u64, now: DateTime<Utc>) -> u64 {
    let Ok(fetched) = DateTime::parse_from_rfc3339(cached_at) else {
        return ttl_secs;
    };
    let age = now
        .signed_duration_since(fetched.with_timezone(&Utc))
        .num_seconds()
        .max(0) as u64;
    ttl_secs.saturating_sub(age)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitiesResponse {
    pub query: String,
    pub results: Vec<CityResult>,
    pub source: Origin,
}

impl CitiesResponse {
    pub fn from_outcome(query: &str, outcome: FetchOutcome<Vec<CityResult>>) -> Self {
        Self {
            query: query.trim().to_string(),
            results: outcome.payload,
            source: outcome.origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceStatus {
    pub cache_ttl_secs: u64,
    pub breaker: BreakerSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub cache_backend: &'static str,
    pub weather: ResourceStatus,
    pub city: ResourceStatus,
}
