//! HTTP transport
//!
//! [`HttpClient`] is the base transport: one logical request, redirects
//! followed by hand, non-success statuses classified into [`ApiError`]s.
//! Retry and rate limiting wrap it as middleware (see [`middleware`]).
//!
//! [`ApiError`]: crate::api::ApiError

pub mod client;
pub mod middleware;
pub mod redirect;
pub mod request;

pub use client::{HttpClient, HttpClientBuilder};
pub use middleware::{RateLimited, Retrying, Transport};
pub use request::{HttpRequest, HttpResponse};
