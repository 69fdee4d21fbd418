//! Reconciliation engine
//!
//! Converges the gateway's managed lists and rule toward a desired domain set
//! and tears them down again. Everything remote goes through
//! [`ports::GatewayPort`]; the local mirror is threaded through explicitly as
//! a [`context::SyncContext`].

pub mod context;
pub mod planner;
pub mod ports;
pub mod report;
pub mod service;
