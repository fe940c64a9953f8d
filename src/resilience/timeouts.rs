//! Call timeout enforcement.
//!
//! # Responsibilities
//! - Race a guarded operation against a deadline
//! - Drop the operation when the deadline wins
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A zero/absent deadline disables the guard entirely
//! - The losing future is dropped, never polled again, so it cannot report
//!   a second outcome

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline fired before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("call exceeded {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `future` to completion unless `limit` elapses first.
pub async fn with_call_timeout<F>(limit: Option<Duration>, future: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    match limit {
        None => Ok(future.await),
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| Elapsed(limit)),
    }
}
