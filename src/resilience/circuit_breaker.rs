//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: upstream assumed down, calls fail fast
//! - Half-Open: a single trial call tests whether the upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= max_failures
//! Open → Half-Open: first call after open_timeout (evaluated lazily, no timer)
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! # Design Decisions
//! - One breaker per resource type (not global)
//! - Fail fast in Open state (the operation is never invoked)
//! - Single trial in Half-Open; other callers are rejected while it runs
//! - All bookkeeping happens under one mutex that is never held across an await
//! - Any success closes the breaker, whichever phase admitted the call
//! - Each trial gets its own ticket so a cancelled trial only frees its own slot

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::timeouts::with_call_timeout;

/// Breaker phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

/// Breaker thresholds and timers. Immutable once the breaker is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the breaker. Always at least 1.
    pub max_failures: u32,
    /// How long the breaker stays open before a trial call is allowed.
    pub open_timeout: Duration,
    /// Deadline for a single guarded call; `None` disables the guard.
    pub call_timeout: Option<Duration>,
}

impl CircuitBreakerConfig {
    /// Build from the millisecond values used in configuration files.
    ///
    /// `call_timeout_ms == 0` disables the call timeout.
    pub fn from_millis(max_failures: u32, open_timeout_ms: u64, call_timeout_ms: u64) -> Self {
        Self {
            max_failures: max_failures.max(1),
            open_timeout: Duration::from_millis(open_timeout_ms),
            call_timeout: (call_timeout_ms > 0).then(|| Duration::from_millis(call_timeout_ms)),
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from_millis(5, 30_000, 5_000)
    }
}

/// Why a guarded call did not produce a value.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker rejected the call without running it.
    #[error("circuit '{name}' is open")]
    CircuitOpen { name: String },

    /// The call exceeded the configured call timeout.
    #[error("call timed out after {0:?}")]
    CallTimeout(Duration),

    /// The operation itself failed.
    #[error("operation failed: {0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// Short label for logs and metrics.
    pub const fn cause(&self) -> &'static str {
        match self {
            Self::CircuitOpen { .. } => "circuit_open",
            Self::CallTimeout(_) => "timeout",
            Self::Operation(_) => "upstream",
        }
    }
}

/// Read-only view of a breaker, exposed on the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub max_failures: u32,
    pub open_timeout_ms: u64,
    pub call_timeout_ms: u64,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    trial_in_flight: bool,
    trial_ticket: u64,
}

impl Default for BreakerInner {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure: None,
            trial_in_flight: false,
            trial_ticket: 0,
        }
    }
}

/// Thread-safe circuit breaker guarding one upstream resource.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        tracing::debug!(
            breaker = %name,
            max_failures = config.max_failures,
            open_timeout_ms = config.open_timeout.as_millis() as u64,
            call_timeout = ?config.call_timeout,
            "Circuit breaker initialized"
        );
        metrics::record_breaker_state(&name, CircuitState::Closed);

        Self {
            name,
            config: CircuitBreakerConfig {
                max_failures: config.max_failures.max(1),
                ..config
            },
            inner: Mutex::new(BreakerInner::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Run `operation` under breaker protection and the call timeout.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = match self.admit() {
            Some(permit) => permit,
            None => {
                metrics::record_breaker_rejection(&self.name);
                return Err(BreakerError::CircuitOpen {
                    name: self.name.clone(),
                });
            }
        };

        match with_call_timeout(self.config.call_timeout, operation()).await {
            Ok(Ok(value)) => {
                permit.succeed();
                Ok(value)
            }
            Ok(Err(err)) => {
                permit.fail();
                Err(BreakerError::Operation(err))
            }
            Err(elapsed) => {
                tracing::warn!(breaker = %self.name, limit = ?elapsed.0, "Guarded call timed out");
                permit.fail();
                Err(BreakerError::CallTimeout(elapsed.0))
            }
        }
    }

    /// Current phase. Never mutates; an expired open window still reads as
    /// `Open` until the next call evaluates it.
    pub fn status(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            max_failures: self.config.max_failures,
            open_timeout_ms: self.config.open_timeout.as_millis() as u64,
            call_timeout_ms: self
                .config
                .call_timeout
                .map(|limit| limit.as_millis() as u64)
                .unwrap_or(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Option<Permit<'_>> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(Permit::new(self, None)),
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure
                    .map(|at| at.elapsed() > self.config.open_timeout)
                    .unwrap_or(true);
                if !cooled_down {
                    return None;
                }

                inner.state = CircuitState::HalfOpen;
                tracing::info!(breaker = %self.name, "Circuit half-open, allowing trial call");
                metrics::record_breaker_state(&self.name, CircuitState::HalfOpen);
                Some(Permit::new(self, Some(inner.start_trial())))
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    return None;
                }
                Some(Permit::new(self, Some(inner.start_trial())))
            }
        }
    }

    fn on_success(&self, trial: Option<u64>) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        inner.finish_trial(trial);
        if inner.state != CircuitState::Closed {
            inner.state = CircuitState::Closed;
            inner.trial_in_flight = false;
            tracing::info!(breaker = %self.name, "Circuit closed");
            metrics::record_breaker_state(&self.name, CircuitState::Closed);
        }
    }

    fn on_failure(&self, trial: Option<u64>) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        inner.last_failure = Some(Instant::now());
        inner.finish_trial(trial);

        let half_open = inner.state == CircuitState::HalfOpen;
        if half_open || inner.consecutive_failures >= self.config.max_failures {
            if inner.state != CircuitState::Open {
                tracing::warn!(
                    breaker = %self.name,
                    consecutive_failures = inner.consecutive_failures,
                    half_open,
                    "Circuit opened"
                );
                metrics::record_breaker_state(&self.name, CircuitState::Open);
            }
            inner.state = CircuitState::Open;
            inner.trial_in_flight = false;
        }
    }

    fn release_trial(&self, ticket: u64) {
        let mut inner = self.lock();
        if inner.trial_in_flight && inner.trial_ticket == ticket {
            inner.trial_in_flight = false;
            tracing::debug!(breaker = %self.name, "Trial call abandoned, releasing slot");
        }
    }
}

impl BreakerInner {
    fn start_trial(&mut self) -> u64 {
        self.trial_ticket = self.trial_ticket.wrapping_add(1);
        self.trial_in_flight = true;
        self.trial_ticket
    }

    fn finish_trial(&mut self, trial: Option<u64>) {
        if trial == Some(self.trial_ticket) {
            self.trial_in_flight = false;
        }
    }
}

/// Admission ticket for one guarded call.
///
/// Dropping an unsettled trial permit frees the half-open slot.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: Option<u64>,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: Option<u64>) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    fn succeed(mut self) {
        self.settled = true;
        self.breaker.on_success(self.trial);
    }

    fn fail(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.trial);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if let (false, Some(ticket)) = (self.settled, self.trial) {
            self.breaker.release_trial(ticket);
        }
    }
}
