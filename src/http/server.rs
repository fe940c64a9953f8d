//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Bind server to listener and stop on shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::service::{CityService, WeatherService};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub cities: Arc<CityService>,
    /// Cache backend label for the status endpoint.
    pub cache_backend: &'static str,
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/weather", get(handlers::weather))
        .route("/api/v1/cities", get(handlers::cities))
        .route("/api/v1/status", get(handlers::status))
        .route_layer(middleware::from_fn(handlers::track_requests))
        .with_state(state);

    api.layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id_of(request),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

/// HTTP server for the weather gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        Self {
            router: build_router(state, request_timeout),
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
