//! # Blockgate Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the gateway, the cache and the domain source
//! - The reconciliation engine and its teardown counterpart
//!
//! ## Architecture Principles
//! - Only depends on `blockgate-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits

pub mod reconcile;

pub use reconcile::context::SyncContext;
pub use reconcile::ports::{CacheStore, DomainSource, GatewayPort};
pub use reconcile::report::{ConvergeReport, DeletionFailure, ResourceKind, RuleChange, TeardownReport};
pub use reconcile::service::{Limits, ReconcileService};
