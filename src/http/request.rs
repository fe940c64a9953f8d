//! Request identification and query extraction.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the client sent none
//! - Echo the request ID on every response
//! - Define the query shapes the handlers accept
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, never replaced

use axum::http::{HeaderName, Request};
use serde::Deserialize;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Read the request ID set by `SetRequestIdLayer`.
pub fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// `GET /api/v1/weather?city=&date=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: String,
    /// `YYYY-MM-DD`; today (UTC) when absent.
    pub date: Option<String>,
}

/// `GET /api/v1/cities?q=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub q: String,
}
