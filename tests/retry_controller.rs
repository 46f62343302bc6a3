//! Retry controller behavior under a paused tokio clock.
//!
//! With `start_paused = true` sleeps complete instantly in virtual time, so
//! attempt timestamps are exact.

use lingo_engine::error::NetworkErrorKind;
use lingo_engine::resilience::{RetryController, RetryPolicy};
use lingo_engine::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn policy(max_retries: u32, base_secs: f64, budget_secs: f64) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_secs_f64(base_secs))
        .with_backoff_factor(2.0)
        .with_jitter(false)
        .with_max_total_timeout(Duration::from_secs_f64(budget_secs))
}

#[tokio::test(start_paused = true)]
async fn test_always_503_makes_three_attempts_with_exponential_delays() {
    let controller = RetryController::new(policy(2, 1.0, 60.0));
    let start = Instant::now();
    let stamps = Mutex::new(Vec::new());
    let stamps_ref = &stamps;

    let err = controller
        .execute(move |_| async move {
            stamps_ref.lock().unwrap().push(start.elapsed());
            Err::<(), _>(Error::api(503, "unavailable", None))
        })
        .await
        .unwrap_err();

    match &err {
        Error::RetryExhausted { attempts, last, .. } => {
            assert_eq!(*attempts, 3);
            assert_eq!(last.status_code(), Some(503));
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(
        *stamps.lock().unwrap(),
        vec![
            Duration::ZERO,
            Duration::from_secs(1),
            Duration::from_secs(3),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fatal_400_is_attempted_once() {
    let controller = RetryController::new(policy(5, 0.1, 60.0));
    let calls = AtomicU32::new(0);
    let calls_ref = &calls;

    let err = controller
        .execute(move |_| async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::api(400, "bad locale", None))
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(err, Error::Api { status: 400, .. }));
    assert_eq!(err.context().and_then(|c| c.attempt), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_budget_smaller_than_first_delay_stops_after_one_attempt() {
    let controller = RetryController::new(policy(5, 1.0, 1.0));
    let calls = AtomicU32::new(0);
    let calls_ref = &calls;

    let err = controller
        .execute(move |_| async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::api(502, "bad gateway", None))
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.attempts(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_means_single_attempt() {
    let controller = RetryController::new(policy(0, 0.5, 60.0));
    let err = controller
        .execute(|_| async { Err::<(), _>(Error::network(NetworkErrorKind::Timeout, "timed out")) })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RetryExhausted { attempts: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() {
    let controller = RetryController::new(policy(3, 0.5, 60.0));
    let value = controller
        .execute(|attempt| async move {
            if attempt < 3 {
                Err(Error::network(NetworkErrorKind::Connection, "reset"))
            } else {
                Ok(attempt)
            }
        })
        .await
        .unwrap();
    assert_eq!(value, 3);
}

#[tokio::test(start_paused = true)]
async fn test_other_network_failures_are_fatal() {
    let controller = RetryController::new(policy(3, 0.5, 60.0));
    let calls = AtomicU32::new(0);
    let calls_ref = &calls;
    let err = controller
        .execute(move |_| async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::network(NetworkErrorKind::Other, "tls"))
        })
        .await
        .unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(err, Error::Network { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_overrides_backoff() {
    let controller = RetryController::new(policy(1, 0.1, 60.0));
    let start = Instant::now();
    let value = controller
        .execute(|attempt| async move {
            if attempt == 1 {
                Err(Error::api(429, "slow down", Some(Duration::from_secs(7))))
            } else {
                Ok(start.elapsed())
            }
        })
        .await
        .unwrap();
    assert_eq!(value, Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_huge_retry_after_exhausts_the_budget() {
    let controller = RetryController::new(policy(3, 0.1, 60.0));
    let calls = AtomicU32::new(0);
    let calls_ref = &calls;
    let start = Instant::now();

    let err = controller
        .execute(move |_| async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(2)).await;
            Err::<(), _>(Error::api(
                429,
                "busy",
                Some(Duration::from_secs(u64::MAX)),
            ))
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(err, Error::RetryExhausted { attempts: 1, .. }));
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_each_retry() {
    let seen: Arc<Mutex<Vec<(u32, Duration)>>> = Arc::default();
    let sink = seen.clone();
    let controller = RetryController::new(policy(2, 1.0, 60.0)).with_observer(Arc::new(
        move |attempt: u32, _err: &Error, delay: Duration| sink.lock().unwrap().push((attempt, delay)),
    ));

    let _ = controller
        .execute(|_| async { Err::<(), _>(Error::api(500, "boom", None)) })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(1, Duration::from_secs(1)), (2, Duration::from_secs(2))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_jitter_stays_within_one_extra_delay() {
    let controller = RetryController::new(policy(1, 1.0, 60.0).with_jitter(true));
    let start = Instant::now();
    let waited = controller
        .execute(|attempt| async move {
            if attempt == 1 {
                Err(Error::api(503, "busy", None))
            } else {
                Ok(start.elapsed())
            }
        })
        .await
        .unwrap();
    assert!(waited >= Duration::from_secs(1));
    assert!(waited <= Duration::from_secs(2));
}
