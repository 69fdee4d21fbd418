//! Error classification shared across blockgate crates
//!
//! Layer-specific error enums stay in their own crates; this module only
//! provides the vocabulary the resilience layer needs to decide what to do
//! with a failure:
//!
//! - **`is_retryable()`**: Can this operation be retried?
//! - **`retry_after()`**: Suggested retry delay (if applicable)

use std::time::Duration;

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network timeouts, rate limiting or temporary service
    /// unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when the failure advertised a specific delay
    /// (e.g. a `Retry-After` header).
    fn retry_after(&self) -> Option<Duration>;
}
