//! Conversions from external infrastructure errors into domain errors.

use blockgate_domain::SyncError;
use reqwest::Error as HttpError;

use crate::api::ApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyncError);

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncError> for InfraError {
    fn from(value: SyncError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return ApiError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return ApiError::Network(format!("HTTP connection failure: {err}"));
        }

        if err.is_builder() {
            return ApiError::Config(format!("invalid HTTP request: {err}"));
        }

        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }

        if let Some(status) = err.status() {
            let code = status.as_u16();
            let message = format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return match code {
                429 => ApiError::RateLimit { message, retry_after: None },
                400..=499 => ApiError::Client { status: code, message },
                500..=599 => ApiError::Server { status: code, message },
                _ => ApiError::Network(message),
            };
        }

        ApiError::Network(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* ApiError → SyncError */
/* -------------------------------------------------------------------------- */

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RateLimit { message, .. } => SyncError::RateLimited(message),
            ApiError::Server { status, message } => SyncError::Server { status, message },
            ApiError::Client { status, message } => SyncError::Client { status, message },
            ApiError::Network(message) => SyncError::Network(message),
            err @ ApiError::TooManyRedirects { .. } => SyncError::Network(err.to_string()),
            ApiError::Config(message) => SyncError::Config(message),
            ApiError::Decode(message) => SyncError::Internal(format!("unexpected response: {message}")),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Config parsing errors → SyncError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(SyncError::Config(format!("invalid TOML config: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(SyncError::Config(format!("invalid JSON config: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
