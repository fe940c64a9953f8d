//! Route handlers.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{MatchedPath, Query, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use crate::http::request::{request_id_of, CitiesQuery, WeatherQuery};
use crate::http::response::{ApiError, CitiesResponse, ResourceStatus, StatusResponse, WeatherResponse};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let outcome = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))?;
            state.weather.fetch_for_date(&query.city, date).await?
        }
        None => state.weather.fetch(&query.city).await?,
    };

    Ok(Json(WeatherResponse::from_outcome(
        outcome,
        state.weather.ttl_secs(),
        Utc::now(),
    )))
}

pub async fn cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Result<Json<CitiesResponse>, ApiError> {
    let outcome = state.cities.fetch(&query.q).await?;
    Ok(Json(CitiesResponse::from_outcome(&query.q, outcome)))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        cache_backend: state.cache_backend,
        weather: ResourceStatus {
            cache_ttl_secs: state.weather.ttl_secs(),
            breaker: state.weather.breaker().snapshot(),
        },
        city: ResourceStatus {
            cache_ttl_secs: state.cities.ttl_secs(),
            breaker: state.cities.breaker().snapshot(),
        },
    })
}

/// Count and time every request by matched route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let request_id = request_id_of(&request);

    let response = next.run(request).await;
    let status = response.status().as_u16();

    tracing::debug!(
        request_id = %request_id,
        route = %route,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(&route, status, start);
    response
}
