//! Integration tests for the resilience module
//!
//! Exercises the retry executor, classified policy and rate gate together the
//! way the gateway client composes them.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blockgate_common::error::ErrorClassification;
use blockgate_common::resilience::{
    ClassifiedRetry, MinIntervalGate, RetryConfig, RetryError, RetryExecutor,
};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
enum FakeError {
    Throttled(Option<Duration>),
    Unavailable,
    Rejected,
}

impl std::fmt::Display for FakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Throttled(_) => write!(f, "throttled"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl ErrorClassification for FakeError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Throttled(after) => *after,
            _ => None,
        }
    }
}

fn fixed_config(attempts: u32, delay: Duration) -> RetryConfig {
    RetryConfig::builder()
        .max_attempts(attempts)
        .fixed_backoff(delay)
        .no_jitter()
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn gated_retries_respect_minimum_spacing() {
    let gate = Arc::new(MinIntervalGate::new(Duration::from_millis(200)));
    let config = fixed_config(4, Duration::ZERO);
    let executor = RetryExecutor::new(config, ClassifiedRetry);
    let calls = Arc::new(AtomicU32::new(0));
    let stamps = Arc::new(support::Stamps::default());

    let start = Instant::now();
    let result = executor
        .execute(|| {
            let gate = gate.clone();
            let calls = calls.clone();
            let stamps = stamps.clone();
            async move {
                gate.acquire().await;
                stamps.push(start.elapsed());
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FakeError::Unavailable)
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    let stamps = stamps.take();
    assert_eq!(stamps.len(), 3);
    for pair in stamps.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(200));
    }
}

#[tokio::test(start_paused = true)]
async fn advertised_wait_is_honored_beyond_backoff_ceiling() {
    let config = RetryConfig::builder()
        .max_attempts(2)
        .exponential_backoff(Duration::from_millis(10), 2.0, Duration::from_secs(3))
        .no_jitter()
        .build()
        .unwrap();
    let executor = RetryExecutor::new(config, ClassifiedRetry);
    let calls = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let result = executor
        .execute(|| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FakeError::Throttled(Some(Duration::from_secs(60))))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert!(result.is_ok());
    assert!(start.elapsed() >= Duration::from_secs(60));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rejected_request_is_not_retried() {
    let config = fixed_config(5, Duration::from_millis(1));
    let executor = RetryExecutor::new(config, ClassifiedRetry);
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), _> = executor
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Rejected)
            }
        })
        .await;

    assert!(matches!(result, Err(RetryError::NonRetryable { source: FakeError::Rejected })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn lenient_profile_outlasts_strict_profile() {
    let strict = RetryConfig::strict();
    let lenient = RetryConfig::lenient();

    for (config, expected) in [(strict, 5), (lenient, 15)] {
        let executor = RetryExecutor::new(config, ClassifiedRetry);
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = executor
            .execute(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(FakeError::Unavailable)
                }
            })
            .await;

        match result {
            Err(RetryError::AttemptsExhausted { attempts, source }) => {
                assert_eq!(attempts, expected);
                assert_eq!(source, FakeError::Unavailable);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), expected);
    }
}

mod support {
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct Stamps(Mutex<Vec<Duration>>);

    impl Stamps {
        pub fn push(&self, stamp: Duration) {
            self.0.lock().unwrap().push(stamp);
        }

        pub fn take(&self) -> Vec<Duration> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }
}
