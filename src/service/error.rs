use thiserror::Error;

/// Errors surfaced to callers of the fetch pipeline.
///
/// Cache failures never appear here; breaker and upstream failures collapse
/// into `UpstreamUnavailable` with the cause kept in logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{resource} data is temporarily unavailable")]
    UpstreamUnavailable { resource: &'static str },
}
