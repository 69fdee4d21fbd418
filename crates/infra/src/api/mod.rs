//! Gateway API client
//!
//! Typed access to the account's lists and rules on top of the
//! [`http`](crate::http) transport stack.

pub mod client;
pub mod errors;
pub mod stale;
pub mod types;

pub use client::GatewayClient;
pub use errors::{ApiError, ApiErrorCategory};
