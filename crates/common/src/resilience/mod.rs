//! Resilience patterns for transient failures
//!
//! This module provides **generic, reusable** building blocks:
//! - **Retry Logic**: configurable attempt budget with exponential backoff and
//!   jitter, driven by a [`RetryPolicy`]
//! - **Rate Gate**: a shared minimum spacing between consecutive calls
//!
//! Both are generic over the error type. Callers compose them as layers around
//! their own transport; see `blockgate_infra::http::middleware`.

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::MinIntervalGate;
pub use retry::{
    BackoffStrategy, ClassifiedRetry, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
