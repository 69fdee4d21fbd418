//! Error types used throughout blockgate

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for a synchronization pass
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Capacity exceeded: {0}")]
    Capacity(#[from] CapacityError),

    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Domain source error: {0}")]
    Source(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether the failure came from a capacity precondition.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Capacity preconditions that abort a pass without partial application.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapacityError {
    #[error("{requested} domains requested, limit is {max}")]
    DomainCeiling { requested: usize, max: usize },

    #[error("at maximum list capacity ({current}/{max})")]
    ListCeiling { current: usize, max: usize },

    #[error("cannot create more lists ({lists}/{max}); {unassigned} domains unassigned")]
    Unassigned { unassigned: usize, lists: usize, max: usize },
}

/// Result type alias for blockgate operations
pub type Result<T> = std::result::Result<T, SyncError>;
