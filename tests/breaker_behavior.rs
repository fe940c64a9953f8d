//! Circuit breaker state machine under realistic call patterns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use weather_gateway::resilience::{
    BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState,
};

fn breaker(max_failures: u32, open_ms: u64, call_ms: u64) -> CircuitBreaker {
    CircuitBreaker::new(
        "upstream",
        CircuitBreakerConfig::from_millis(max_failures, open_ms, call_ms),
    )
}

async fn counted_call(
    breaker: &CircuitBreaker,
    calls: &AtomicUsize,
    succeed: bool,
) -> Result<(), BreakerError<&'static str>> {
    breaker
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            if succeed {
                Ok(())
            } else {
                Err("upstream down")
            }
        })
        .await
}

#[tokio::test(start_paused = true)]
async fn test_scenario_open_then_fast_fail_then_trial() {
    let breaker = breaker(3, 1_000, 100);
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let result = counted_call(&breaker, &calls, false).await;
        assert!(matches!(result, Err(BreakerError::Operation(_))));
    }
    assert_eq!(breaker.status(), CircuitState::Open);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    tokio::time::advance(Duration::from_millis(50)).await;
    let result = counted_call(&breaker, &calls, true).await;
    assert!(matches!(result, Err(BreakerError::CircuitOpen { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    tokio::time::advance(Duration::from_millis(1_450)).await;
    let result = counted_call(&breaker, &calls, true).await;
    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(breaker.status(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_open_exactly_at_threshold_not_before() {
    for max_failures in 1..=6 {
        let breaker = breaker(max_failures, 1_000, 0);
        let calls = AtomicUsize::new(0);

        for i in 1..=max_failures {
            let _ = counted_call(&breaker, &calls, false).await;
            let expected = if i == max_failures {
                CircuitState::Open
            } else {
                CircuitState::Closed
            };
            assert_eq!(breaker.status(), expected, "after failure {i} of {max_failures}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_open_window_never_invokes_operation() {
    let breaker = breaker(2, 1_000, 0);
    let calls = AtomicUsize::new(0);
    let _ = counted_call(&breaker, &calls, false).await;
    let _ = counted_call(&breaker, &calls, false).await;
    let before = calls.load(Ordering::SeqCst);

    for _ in 0..10 {
        tokio::time::advance(Duration::from_millis(99)).await;
        let result = counted_call(&breaker, &calls, true).await;
        assert!(matches!(result, Err(BreakerError::CircuitOpen { .. })));
    }
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[tokio::test(start_paused = true)]
async fn test_trial_failure_reopens_regardless_of_count() {
    let breaker = breaker(5, 1_000, 0);
    let calls = AtomicUsize::new(0);
    for _ in 0..5 {
        let _ = counted_call(&breaker, &calls, false).await;
    }
    assert_eq!(breaker.status(), CircuitState::Open);

    tokio::time::advance(Duration::from_millis(1_001)).await;
    let result = counted_call(&breaker, &calls, false).await;
    assert!(matches!(result, Err(BreakerError::Operation(_))));
    assert_eq!(breaker.status(), CircuitState::Open);

    // The trial failure refreshed the open window.
    tokio::time::advance(Duration::from_millis(500)).await;
    let result = counted_call(&breaker, &calls, true).await;
    assert!(matches!(result, Err(BreakerError::CircuitOpen { .. })));

    tokio::time::advance(Duration::from_millis(501)).await;
    assert!(counted_call(&breaker, &calls, true).await.is_ok());
    assert_eq!(breaker.status(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_second_caller_rejected_during_trial() {
    let breaker = Arc::new(breaker(1, 100, 0));
    let calls = AtomicUsize::new(0);
    let _ = counted_call(&breaker, &calls, false).await;
    tokio::time::advance(Duration::from_millis(101)).await;

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let trial = {
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = release_rx.await;
                    Ok::<_, &str>("trial")
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(breaker.status(), CircuitState::HalfOpen);

    let result = counted_call(&breaker, &calls, true).await;
    assert!(matches!(result, Err(BreakerError::CircuitOpen { .. })));

    release_tx.send(()).unwrap();
    assert_eq!(trial.await.unwrap().unwrap(), "trial");
    assert_eq!(breaker.status(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_trial_releases_slot() {
    let breaker = Arc::new(breaker(1, 100, 0));
    let calls = AtomicUsize::new(0);
    let _ = counted_call(&breaker, &calls, false).await;
    tokio::time::advance(Duration::from_millis(101)).await;

    let trial = {
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            breaker
                .execute(|| async {
                    std::future::pending::<()>().await;
                    Ok::<_, &str>(())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(breaker.status(), CircuitState::HalfOpen);

    trial.abort();
    let _ = trial.await;

    assert!(counted_call(&breaker, &calls, true).await.is_ok());
    assert_eq!(breaker.status(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_and_late_completion_is_ignored() {
    let breaker = breaker(2, 1_000, 100);
    let finished = AtomicUsize::new(0);
    let finished_ref = &finished;

    let result = breaker
        .execute(|| async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            finished_ref.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>(())
        })
        .await;

    assert!(matches!(result, Err(BreakerError::CallTimeout(d)) if d == Duration::from_millis(100)));
    assert_eq!(breaker.consecutive_failures(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 0);
    assert_eq!(breaker.consecutive_failures(), 1);
    assert_eq!(breaker.status(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_trips_breaker_like_any_failure() {
    let breaker = breaker(2, 1_000, 50);
    for _ in 0..2 {
        let result = breaker
            .execute(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, &str>(())
            })
            .await;
        assert!(matches!(result, Err(BreakerError::CallTimeout(_))));
    }
    assert_eq!(breaker.status(), CircuitState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_late_success_closes_breaker_tripped_meanwhile() {
    let breaker = Arc::new(breaker(1, 10_000, 0));

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let slow = {
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = release_rx.await;
                    Ok::<_, &str>(())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    let calls = AtomicUsize::new(0);
    let _ = counted_call(&breaker, &calls, false).await;
    assert_eq!(breaker.status(), CircuitState::Open);
    assert_eq!(breaker.consecutive_failures(), 1);

    release_tx.send(()).unwrap();
    assert!(slow.await.unwrap().is_ok());
    assert_eq!(breaker.status(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);

    assert!(counted_call(&breaker, &calls, true).await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_late_failure_during_trial_reopens() {
    let breaker = Arc::new(breaker(2, 100, 0));

    let (fail_tx, fail_rx) = tokio::sync::oneshot::channel::<()>();
    let slow = {
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = fail_rx.await;
                    Err::<(), _>("late")
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    let calls = AtomicUsize::new(0);
    let _ = counted_call(&breaker, &calls, false).await;
    let _ = counted_call(&breaker, &calls, false).await;
    assert_eq!(breaker.status(), CircuitState::Open);
    tokio::time::advance(Duration::from_millis(101)).await;

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let trial = {
        let breaker = Arc::clone(&breaker);
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = release_rx.await;
                    Ok::<_, &str>(())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(breaker.status(), CircuitState::HalfOpen);

    fail_tx.send(()).unwrap();
    assert!(slow.await.unwrap().is_err());
    assert_eq!(breaker.status(), CircuitState::Open);

    release_tx.send(()).unwrap();
    assert!(trial.await.unwrap().is_ok());
    assert_eq!(breaker.status(), CircuitState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_lose_no_increments() {
    let breaker = Arc::new(breaker(1_000, 60_000, 0));
    let mut handles = Vec::new();

    for _ in 0..64 {
        let breaker = Arc::clone(&breaker);
        handles.push(tokio::spawn(async move {
            breaker
                .execute(|| async {
                    tokio::task::yield_now().await;
                    Err::<(), _>("boom")
                })
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }

    assert_eq!(breaker.consecutive_failures(), 64);
    assert_eq!(breaker.status(), CircuitState::Closed);
}
