//! # Blockgate Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport with manual redirects and composable retry / rate-limit
//!   middleware
//! - The gateway REST client (`GatewayPort`)
//! - The JSON cache file store (`CacheStore`)
//! - Block-list sources (`DomainSource`)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `blockgate-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod http;
pub mod sources;

// Re-export commonly used items
pub use api::{ApiError, ApiErrorCategory, GatewayClient};
pub use cache::JsonFileCache;
pub use errors::InfraError;
pub use http::{HttpClient, HttpRequest, HttpResponse, RateLimited, Retrying, Transport};
pub use sources::{Downloader, ListSources};
