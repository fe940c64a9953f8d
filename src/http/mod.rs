//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, query extraction)
//!     → handlers.rs (call WeatherService / CityService)
//!     → response.rs (wire shapes, error → status mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, CitiesResponse, StatusResponse, WeatherResponse};
pub use server::{build_router, AppState, HttpServer};
