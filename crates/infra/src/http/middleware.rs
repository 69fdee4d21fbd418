//! Transport middleware
//!
//! Layers compose by wrapping: `Retrying<RateLimited<HttpClient>>` waits on
//! the gate before every attempt, retries included.

use std::sync::Arc;

use async_trait::async_trait;
use blockgate_common::resilience::{ClassifiedRetry, MinIntervalGate, RetryConfig, RetryError, RetryExecutor};

use super::client::HttpClient;
use super::request::{HttpRequest, HttpResponse};
use crate::api::ApiError;

/// Anything that can carry an [`HttpRequest`] to a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        HttpClient::send(self, request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request).await
    }
}

/// Waits on a shared [`MinIntervalGate`] before each request.
pub struct RateLimited<T> {
    inner: T,
    gate: Arc<MinIntervalGate>,
}

impl<T> RateLimited<T> {
    pub fn new(inner: T, gate: Arc<MinIntervalGate>) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimited<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.gate.acquire().await;
        self.inner.send(request).await
    }
}

/// Retries failed requests according to their [`ApiError`] classification.
pub struct Retrying<T> {
    inner: T,
    executor: RetryExecutor<ClassifiedRetry>,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, executor: RetryExecutor::new(config, ClassifiedRetry) }
    }
}

#[async_trait]
impl<T: Transport> Transport for Retrying<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.executor.execute(|| self.inner.send(request)).await.map_err(flatten)
    }
}

/// The caller sees the last underlying error, not the retry wrapper.
fn flatten(err: RetryError<ApiError>) -> ApiError {
    match err {
        RetryError::InvalidConfiguration { message } => ApiError::Config(message),
        other => other.into_source().unwrap_or_else(|| ApiError::Config("retry produced no error".into())),
    }
}
