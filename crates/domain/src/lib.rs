//! # Blockgate Domain
//!
//! Domain types and models for blockgate.
//!
//! This crate contains:
//! - Domain data types (`Domain`, `ListName`, `ResourceList`, `Rule`)
//! - The local cache snapshot
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Capacity constants
//!
//! ## Architecture
//! - No dependencies on other blockgate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
